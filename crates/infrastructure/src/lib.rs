//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_role_store;
mod http_entity_collection_api;
mod in_memory_entity_collection_api;

pub use file_role_store::FileRoleStore;
pub use http_entity_collection_api::HttpEntityCollectionApi;
pub use in_memory_entity_collection_api::InMemoryEntityCollectionApi;
