use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cmms_application::EntityCollectionApi;
use cmms_domain::EntityRecord;
use serde_json::Value;
use tracing::info;

use crate::dto::MessageResponse;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_records_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
) -> ApiResult<Json<Vec<EntityRecord>>> {
    let records = state.store.list(&collection).await?;
    Ok(Json(records))
}

pub async fn create_record_handler(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let Json(payload) = payload?;
    let record = EntityRecord::from_value(payload)?;
    let receipt = state.store.create(&collection, &record).await?;

    info!(collection = %collection, "record created");
    Ok((StatusCode::CREATED, Json(MessageResponse::new(receipt.message))))
}

pub async fn update_record_handler(
    State(state): State<AppState>,
    Path((collection, record_id)): Path<(String, String)>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<MessageResponse>> {
    let Json(payload) = payload?;
    let patch = EntityRecord::from_value(payload)?;
    let receipt = state.store.update(&collection, &record_id, &patch).await?;

    info!(collection = %collection, record_id = %record_id, "record updated");
    Ok(Json(MessageResponse::new(receipt.message)))
}

pub async fn delete_record_handler(
    State(state): State<AppState>,
    Path((collection, record_id)): Path<(String, String)>,
) -> ApiResult<Json<MessageResponse>> {
    let receipt = state.store.delete(&collection, &record_id).await?;

    info!(collection = %collection, record_id = %record_id, "record deleted");
    Ok(Json(MessageResponse::new(receipt.message)))
}
