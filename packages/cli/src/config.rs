use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use userreg_config::{
    env_string, DEFAULT_BUSY_TIMEOUT_SECS, DEFAULT_DB_PATH, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_PASSWORD_SCHEME, USERREG_BUSY_TIMEOUT_SECS, USERREG_DB_PATH, USERREG_MAX_CONNECTIONS,
    USERREG_PASSWORD_SCHEME,
};
use userreg_storage::{PasswordScheme, StoreConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] ParseIntError),
    #[error("{0} must be at least 1")]
    OutOfRange(&'static str),
    #[error("Invalid password scheme: {0}")]
    InvalidPasswordScheme(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub db_path: PathBuf,
    pub password_scheme: PasswordScheme,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let db_path = env_string(USERREG_DB_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let password_scheme = parse_scheme(
            &env_string(USERREG_PASSWORD_SCHEME)
                .unwrap_or_else(|| DEFAULT_PASSWORD_SCHEME.to_string()),
        )?;

        let max_connections = match env_string(USERREG_MAX_CONNECTIONS) {
            Some(raw) => raw.parse::<u32>()?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        if max_connections == 0 {
            return Err(ConfigError::OutOfRange(USERREG_MAX_CONNECTIONS));
        }

        let busy_timeout_seconds = match env_string(USERREG_BUSY_TIMEOUT_SECS) {
            Some(raw) => raw.parse::<u64>()?,
            None => DEFAULT_BUSY_TIMEOUT_SECS,
        };

        Ok(Config {
            db_path,
            password_scheme,
            max_connections,
            busy_timeout_seconds,
        })
    }

    /// Apply command-line overrides on top of the environment.
    pub fn with_overrides(
        mut self,
        db_path: Option<PathBuf>,
        password_scheme: Option<&str>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = db_path {
            self.db_path = path;
        }
        if let Some(scheme) = password_scheme {
            self.password_scheme = parse_scheme(scheme)?;
        }
        Ok(self)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            path: self.db_path.clone(),
            password_scheme: self.password_scheme,
            max_connections: self.max_connections,
            busy_timeout_seconds: self.busy_timeout_seconds,
        }
    }
}

fn parse_scheme(raw: &str) -> Result<PasswordScheme, ConfigError> {
    raw.parse::<PasswordScheme>()
        .map_err(|_| ConfigError::InvalidPasswordScheme(raw.to_string()))
}
