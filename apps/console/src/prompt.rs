use async_trait::async_trait;
use cmms_application::ConfirmationPrompt;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

/// Terminal confirmation that reads `y`/`yes` from stdin.
pub struct StdinConfirmationPrompt {
    assume_yes: bool,
}

impl StdinConfirmationPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

#[async_trait]
impl ConfirmationPrompt for StdinConfirmationPrompt {
    async fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        let mut stdout = tokio::io::stdout();
        let prompt = format!("{message} [y/N] ");
        if let Err(error) = stdout.write_all(prompt.as_bytes()).await {
            warn!(error = %error, "failed to write confirmation prompt");
            return false;
        }
        if stdout.flush().await.is_err() {
            return false;
        }

        let mut answer = String::new();
        let mut reader = BufReader::new(tokio::io::stdin());
        match reader.read_line(&mut answer).await {
            Ok(_) => is_affirmative(&answer),
            Err(error) => {
                warn!(error = %error, "failed to read confirmation answer");
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
