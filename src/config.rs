use crate::{
    cursor::FetchMode,
    result::{AccessError, Result},
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::str::FromStr;

/// Whether rows are read eagerly by default.
///
/// Individual queries may still pick a [`FetchMode`]; this only decides for
/// queries that do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Buffering {
    #[default]
    Buffered,
    Unbuffered,
}

impl Buffering {
    pub fn default_fetch_mode(&self) -> FetchMode {
        match self {
            Buffering::Buffered => FetchMode::Materialized,
            Buffering::Unbuffered => FetchMode::Streaming,
        }
    }
}

impl FromStr for Buffering {
    type Err = AccessError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "buffered" => Ok(Buffering::Buffered),
            "unbuffered" => Ok(Buffering::Unbuffered),
            _ => Err(AccessError::Config(format!(
                "buffering must be 'buffered' or 'unbuffered', got '{s}'"
            ))),
        }
    }
}

fn default_create_if_missing() -> bool {
    true
}

/// Connection settings for a [`crate::TableAccessor`].
///
/// SQLite uses `database` as the file path (or `:memory:`) and ignores
/// host, port and credentials.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessorConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    pub database: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub buffering: Buffering,
    #[serde(default = "default_create_if_missing")]
    pub create_if_missing: bool,
    #[serde(default)]
    pub busy_timeout_ms: Option<u64>,
    /// Statements run right after connecting; `None` uses the dialect's defaults
    #[serde(default)]
    pub init_statements: Option<Vec<String>>,
}

impl AccessorConfig {
    pub fn new(database: impl Into<String>) -> Self {
        AccessorConfig {
            host: None,
            port: None,
            database: database.into(),
            user: None,
            password: None,
            buffering: Buffering::default(),
            create_if_missing: default_create_if_missing(),
            busy_timeout_ms: None,
            init_statements: None,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(":memory:")
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_buffering(mut self, buffering: Buffering) -> Self {
        self.buffering = buffering;
        self
    }

    pub fn with_init_statements(mut self, statements: Vec<String>) -> Self {
        self.init_statements = Some(statements);
        self
    }

    /// Load the configuration from a JSON file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let json: serde_json::Value = serde_json::from_str(&content)?;
        Self::from_json(json)
    }

    /// Load the configuration from a serde_json::Value object
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        if !json.is_object() {
            return Err(AccessError::Config(format!(
                "expected an object, got {json}"
            )));
        }
        let config: AccessorConfig = serde_json::from_value(json)?;
        if config.database.is_empty() {
            return Err(AccessError::Config("database must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Read `DB_HOST`, `DB_PORT`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`,
    /// `DB_BUFFERING` and `DB_BUSY_TIMEOUT_MS` from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AccessorConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database = lookup("DB_NAME")
            .filter(|name| !name.is_empty())
            .ok_or_else(|| AccessError::Config("DB_NAME is not set".to_string()))?;
        let mut config = AccessorConfig::new(database);
        config.host = lookup("DB_HOST");
        config.user = lookup("DB_USER");
        config.password = lookup("DB_PASSWORD");

        if let Some(port) = lookup("DB_PORT") {
            config.port = Some(
                port.parse()
                    .map_err(|_| AccessError::Config(format!("DB_PORT is not a port: '{port}'")))?,
            );
        }
        if let Some(buffering) = lookup("DB_BUFFERING") {
            config.buffering = buffering.parse()?;
        }
        if let Some(timeout) = lookup("DB_BUSY_TIMEOUT_MS") {
            config.busy_timeout_ms = Some(timeout.parse().map_err(|_| {
                AccessError::Config(format!("DB_BUSY_TIMEOUT_MS is not a number: '{timeout}'"))
            })?);
        }
        Ok(config)
    }
}

impl fmt::Debug for AccessorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("buffering", &self.buffering)
            .field("create_if_missing", &self.create_if_missing)
            .field("busy_timeout_ms", &self.busy_timeout_ms)
            .field("init_statements", &self.init_statements)
            .finish()
    }
}
