use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_MODEL, OPENAI_CHAT_URL};

/// Application configuration loaded from environment variables.
/// Only `PORT` can fail; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Missing key is tolerated at startup; completion calls fail until it is set.
    pub openai_api_key: Option<String>,
    pub openai_chat_url: String,
    pub openai_model: String,
    pub port: u16,
    pub rust_log: String,
    pub data_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_chat_url: env_or("OPENAI_CHAT_URL", OPENAI_CHAT_URL),
            openai_model: env_or("OPENAI_MODEL", DEFAULT_MODEL),
            port: env_or("PORT", "3000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            uploads_dir: PathBuf::from(env_or("UPLOADS_DIR", "uploads")),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "public")),
        })
    }

    /// Directory that card images are written to and served from.
    pub fn card_images_dir(&self) -> PathBuf {
        self.uploads_dir.join("business-cards")
    }
}

/// Reads an env var, treating a blank value the same as an unset one.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
impl Config {
    /// Config pointing every directory at `root`, with no API key.
    pub fn for_tests(root: &std::path::Path) -> Self {
        Config {
            openai_api_key: None,
            openai_chat_url: OPENAI_CHAT_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            data_dir: root.join("data"),
            uploads_dir: root.join("uploads"),
            static_dir: root.join("public"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_images_dir_is_under_uploads() {
        let config = Config::for_tests(std::path::Path::new("/srv/app"));
        assert_eq!(
            config.card_images_dir(),
            PathBuf::from("/srv/app/uploads/business-cards")
        );
    }
}
