use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Mutation acknowledgement payload.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: Option<String>) -> Self {
        Self {
            message: message.unwrap_or_default(),
        }
    }
}

/// Bulk import payload.
///
/// Both fields stay loose so shape errors surface as 400 messages rather
/// than extractor rejections.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub entity: Option<String>,
    pub items: Option<Value>,
}
