use async_trait::async_trait;
use cmms_application::{EntityCollectionApi, MutationReceipt};
use cmms_core::{AppError, AppResult};
use cmms_domain::EntityRecord;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;


#[derive(Serialize)]
struct ImportRequest<'a> {
    entity: &'a str,
    items: &'a [EntityRecord],
}

/// REST implementation of [`EntityCollectionApi`].
///
/// Talks to `{base}/{collection}`, `{base}/{collection}/{id}` and
/// `{base}/import`. Server errors surface the `error` (or `message`) field
/// of the JSON body verbatim.
#[derive(Debug, Clone)]
pub struct HttpEntityCollectionApi {
    http_client: reqwest::Client,
    base_url: Url,
}

impl HttpEntityCollectionApi {
    /// Creates an adapter rooted at `base_url`, e.g. `http://127.0.0.1:5050/api`.
    pub fn new(http_client: reqwest::Client, base_url: &str) -> AppResult<Self> {
        let base_url = Url::parse(base_url).map_err(|error| {
            AppError::Validation(format!("invalid API base URL '{base_url}': {error}"))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "API base URL '{base_url}' cannot carry path segments"
            )));
        }

        Ok(Self {
            http_client,
            base_url,
        })
    }

    /// Returns the configured base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "API base URL '{}' cannot carry path segments",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> AppResult<reqwest::Response> {
        debug!(method = %method, url = %url, "calling entity collection");

        let mut request = self.http_client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|error| AppError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(error_from_response(status, &body))
    }

    async fn mutation<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> AppResult<MutationReceipt> {
        let response = self.send(method, url, body).await?;
        let text = response
            .text()
            .await
            .map_err(|error| AppError::Transport(error.to_string()))?;

        Ok(receipt_from_body(&text))
    }
}

/// Maps a failed response to an [`AppError`] carrying the server text.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .or_else(|| value.get("message"))
                .and_then(Value::as_str)
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::Validation(message),
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Internal(message),
    }
}

/// Reads the optional `message` of a mutation response body.
pub(crate) fn receipt_from_body(body: &str) -> MutationReceipt {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(Value::as_str)
                .map(MutationReceipt::with_message)
        })
        .unwrap_or_default()
}

#[async_trait]
impl EntityCollectionApi for HttpEntityCollectionApi {
    async fn list(&self, collection: &str) -> AppResult<Vec<EntityRecord>> {
        let url = self.endpoint(&[collection])?;
        let response = self.send::<()>(Method::GET, url, None).await?;

        response.json::<Vec<EntityRecord>>().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to parse '{collection}' collection response body: {error}"
            ))
        })
    }

    async fn create(&self, collection: &str, record: &EntityRecord) -> AppResult<MutationReceipt> {
        let url = self.endpoint(&[collection])?;
        self.mutation(Method::POST, url, Some(record)).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        patch: &EntityRecord,
    ) -> AppResult<MutationReceipt> {
        let url = self.endpoint(&[collection, id])?;
        self.mutation(Method::PUT, url, Some(patch)).await
    }

    async fn delete(&self, collection: &str, id: &str) -> AppResult<MutationReceipt> {
        let url = self.endpoint(&[collection, id])?;
        self.mutation::<()>(Method::DELETE, url, None).await
    }

    async fn import(
        &self,
        collection: &str,
        items: &[EntityRecord],
    ) -> AppResult<MutationReceipt> {
        let url = self.endpoint(&["import"])?;
        let body = ImportRequest {
            entity: collection,
            items,
        };
        self.mutation(Method::POST, url, Some(&body)).await
    }
}
