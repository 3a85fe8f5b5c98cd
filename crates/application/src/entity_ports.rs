mod collection_api;
mod prompts;
mod role_store;

pub use collection_api::{EntityCollectionApi, MutationReceipt};
pub use prompts::ConfirmationPrompt;
pub use role_store::RoleStore;
