use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use cmms_application::EntityCollectionApi;
use cmms_core::AppError;
use cmms_domain::EntityRecord;
use serde_json::Value;
use tracing::info;

use crate::dto::{ImportRequest, MessageResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn import_records_handler(
    State(state): State<AppState>,
    payload: Result<Json<ImportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let (Some(entity), Some(items)) = (payload.entity, payload.items) else {
        return Err(AppError::Validation("Missing 'entity' or 'items'".to_owned()).into());
    };
    let Value::Array(items) = items else {
        return Err(AppError::Validation("'items' must be a list".to_owned()).into());
    };

    let records = items
        .into_iter()
        .map(EntityRecord::from_value)
        .collect::<Result<Vec<_>, _>>()?;
    let receipt = state.store.import(&entity, &records).await?;

    info!(collection = %entity, count = records.len(), "records imported");
    Ok((StatusCode::CREATED, Json(MessageResponse::new(receipt.message))))
}
