use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Backlog API key is not set (BACKLOG_API_KEY or .review-sheet.toml)")]
    MissingApiKey,

    #[error("Backlog space is not set (BACKLOG_SPACE or .review-sheet.toml)")]
    MissingSpace,
}

/// Resolved configuration: the API credential and the Backlog space domain.
///
/// Both values come from the environment (`BACKLOG_API_KEY`,
/// `BACKLOG_SPACE`, with `.env` honored) or from an optional
/// `.review-sheet.toml` in the current directory; the environment wins.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    /// Bare space domain, e.g. `example.backlog.com`
    pub space: String,
}

/// On-disk shape of .review-sheet.toml.
#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    backlog: BacklogSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BacklogSection {
    api_key: Option<String>,
    space: Option<String>,
}

impl Config {
    /// Load and resolve configuration. Fails when either value is missing
    /// from both the environment and the config file.
    pub fn load() -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();

        let path = Path::new(".review-sheet.toml");
        let file = if path.exists() {
            Self::read_file(path)?
        } else {
            FileConfig::default()
        };

        let api_key = std::env::var("BACKLOG_API_KEY")
            .ok()
            .or(file.backlog.api_key)
            .ok_or(ConfigError::MissingApiKey)?;
        let space = std::env::var("BACKLOG_SPACE")
            .ok()
            .or(file.backlog.space)
            .ok_or(ConfigError::MissingSpace)?;

        Ok(Config {
            api_key,
            space: normalize_space(&space),
        })
    }

    fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let file = toml::from_str(&contents)?;
        Ok(file)
    }

    /// Base endpoint for all API calls.
    pub fn base_url(&self) -> String {
        format!("https://{}/api/v2", self.space)
    }
}

/// Accept the space either as a bare domain or as a URL: strip a leading
/// `https://` scheme and any trailing slash.
fn normalize_space(raw: &str) -> String {
    let without_scheme = raw.strip_prefix("https://").unwrap_or(raw);
    without_scheme.trim_end_matches('/').to_string()
}
