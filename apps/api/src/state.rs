use std::sync::Arc;

use cmms_infrastructure::InMemoryEntityCollectionApi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InMemoryEntityCollectionApi>,
}
