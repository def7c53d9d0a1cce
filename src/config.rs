use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable holding the Bot API token.
pub const TOKEN_ENV_VAR: &str = "TELEGRAM_BOT_TOKEN";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// File the config was read from, if one existed
    #[serde(skip)]
    pub file: Option<PathBuf>,
    #[serde(skip)]
    pub token_from_env: bool,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "info,simplebot=debug".to_string()
}

impl Config {
    /// Load the optional config file, then apply the environment token on top.
    ///
    /// A missing file is not an error; a malformed one is. The token is required
    /// from one of the two sources.
    pub fn load(path: &Path) -> Result<Self> {
        let content = read_optional(path)?;
        let mut config = Self::from_parts(content.as_deref(), std::env::var(TOKEN_ENV_VAR).ok())?;
        if content.is_some() {
            config.file = Some(path.to_path_buf());
        }
        Ok(config)
    }

    /// Human-readable list of where the settings came from, for the startup log.
    pub fn sources(&self) -> String {
        let token = if self.token_from_env {
            format!("token from {}", TOKEN_ENV_VAR)
        } else {
            "token from config file".to_string()
        };
        match &self.file {
            Some(path) => format!("{}, config file {}", token, path.display()),
            None => format!("{}, no config file", token),
        }
    }

    /// Build a config from raw TOML text and an environment token.
    pub fn from_parts(file: Option<&str>, env_token: Option<String>) -> Result<Self> {
        let mut config: Config = match file {
            Some(content) => toml::from_str(content).context("Failed to parse config file")?,
            None => Config::default(),
        };

        if let Some(token) = env_token.filter(|t| !t.trim().is_empty()) {
            config.telegram.bot_token = token;
            config.token_from_env = true;
        }

        if config.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("{} environment variable not set!", TOKEN_ENV_VAR);
        }

        Ok(config)
    }
}

/// Read `path` if it exists. `Ok(None)` means there is no file.
fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    Ok(Some(content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_token_only() {
        let config = Config::from_parts(None, Some("123:abc".to_string())).unwrap();
        assert_eq!(config.telegram.bot_token, "123:abc");
        assert_eq!(config.logging.filter, "info,simplebot=debug");
    }

    #[test]
    fn test_missing_token_is_fatal() {
        let err = Config::from_parts(None, None).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn test_blank_env_token_is_treated_as_missing() {
        assert!(Config::from_parts(None, Some("   ".to_string())).is_err());
    }

    #[test]
    fn test_env_token_overrides_file() {
        let file = r#"
[telegram]
bot_token = "from-file"
"#;
        let config = Config::from_parts(Some(file), Some("from-env".to_string())).unwrap();
        assert_eq!(config.telegram.bot_token, "from-env");
    }

    #[test]
    fn test_file_token_and_filter() {
        let file = r#"
[telegram]
bot_token = "from-file"

[logging]
filter = "warn"
"#;
        let config = Config::from_parts(Some(file), None).unwrap();
        assert_eq!(config.telegram.bot_token, "from-file");
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let err = Config::from_parts(Some("[telegram"), Some("t".to_string())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let path = Path::new("definitely/not/here/config.toml");
        assert!(read_optional(path).unwrap().is_none());
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        // A directory exists but cannot be read as a file
        let err = read_optional(Path::new("src")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_sources_name_the_token_origin() {
        let env = Config::from_parts(None, Some("t".to_string())).unwrap();
        assert!(env.token_from_env);
        assert_eq!(env.sources(), "token from TELEGRAM_BOT_TOKEN, no config file");

        let mut file = Config::from_parts(Some("[telegram]\nbot_token = \"f\""), None).unwrap();
        file.file = Some(PathBuf::from("config.toml"));
        assert!(!file.token_from_env);
        assert_eq!(file.sources(), "token from config file, config file config.toml");
    }
}
