use std::env;
use std::path::PathBuf;

use cmms_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub role_file: PathBuf,
    pub http_timeout_secs: u64,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        let api_url =
            env::var("CMMS_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5050/api".to_owned());
        let role_file = env::var("CMMS_ROLE_FILE")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_role_file);
        let http_timeout_secs = parse_env_u64("CMMS_HTTP_TIMEOUT_SECS", 10)?;

        if http_timeout_secs == 0 {
            return Err(AppError::Validation(
                "CMMS_HTTP_TIMEOUT_SECS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_url,
            role_file,
            http_timeout_secs,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn default_role_file() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".cmms")
        .join("role.json")
}

fn parse_env_u64(name: &str, default: u64) -> AppResult<u64> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
