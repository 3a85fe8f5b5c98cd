use async_trait::async_trait;

/// Port for interactive yes/no confirmation before destructive actions.
#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Asks the user to confirm `message`. Returns `true` to proceed.
    async fn confirm(&self, message: &str) -> bool;
}
