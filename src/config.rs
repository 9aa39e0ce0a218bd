use crate::directory::CreatePolicy;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the student directory server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Whether the sample students are loaded at startup.
    pub seed_sample_data: bool,
    /// Whether create may overwrite an existing student with the same id.
    pub allow_upsert: bool,
    /// Log file override; `None` selects the default path.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: None,
            seed_sample_data: true,
            allow_upsert: false,
            log_file: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            server_port: optional("SERVER_PORT")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            seed_sample_data: optional("STUDENT_DIRECTORY_SEED")
                .map(|value| parse_flag("STUDENT_DIRECTORY_SEED", &value))
                .transpose()?
                .unwrap_or(defaults.seed_sample_data),
            allow_upsert: optional("STUDENT_DIRECTORY_ALLOW_UPSERT")
                .map(|value| parse_flag("STUDENT_DIRECTORY_ALLOW_UPSERT", &value))
                .transpose()?
                .unwrap_or(defaults.allow_upsert),
            log_file: optional("STUDENT_DIRECTORY_LOG_FILE").map(PathBuf::from),
        })
    }

    /// Layer command-line flags over the environment.
    ///
    /// A given port replaces `SERVER_PORT`; `no_seed` and `allow_upsert` only ever switch their
    /// setting in the flag's direction.
    pub fn apply_overrides(
        mut self,
        port: Option<u16>,
        no_seed: bool,
        allow_upsert: bool,
    ) -> Self {
        if port.is_some() {
            self.server_port = port;
        }
        if no_seed {
            self.seed_sample_data = false;
        }
        if allow_upsert {
            self.allow_upsert = true;
        }
        self
    }

    /// Duplicate-id policy applied by create.
    pub fn create_policy(&self) -> CreatePolicy {
        if self.allow_upsert {
            CreatePolicy::Upsert
        } else {
            CreatePolicy::Reject
        }
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Load configuration from the environment after applying any `.env` file.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}
