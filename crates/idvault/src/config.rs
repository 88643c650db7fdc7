use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Server settings read from the process environment.
#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    /// Append-only ledger log. `None` keeps the ledger in memory.
    pub ledger_path: Option<PathBuf>,
    pub admin: Option<AdminCredentials>,
}

#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IDVAULT_ADDR is not a socket address: {0}")]
    InvalidAddr(String),
    #[error("IDVAULT_ADMIN_USERNAME and IDVAULT_ADMIN_PASSWORD must be set together")]
    PartialAdmin,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let addr = non_empty("IDVAULT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr
            .parse()
            .map_err(|_| ConfigError::InvalidAddr(addr.clone()))?;

        let admin = match (
            non_empty("IDVAULT_ADMIN_USERNAME"),
            non_empty("IDVAULT_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminCredentials { username, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialAdmin),
        };

        Ok(Self {
            addr,
            ledger_path: non_empty("IDVAULT_LEDGER_PATH").map(PathBuf::from),
            admin,
        })
    }
}
