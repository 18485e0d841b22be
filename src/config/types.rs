//! The configuration structs used to build the AppConfig, and their impls.
use axum::http::HeaderValue;
use lazy_regex::regex_captures;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sqlx::{
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions,
};
use strum_macros::AsRefStr;

use crate::config::{ConfigError, ConfigResult};

// ###################################
// ->   STRUCTS
// ###################################
#[derive(AsRefStr, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Production,
}

#[derive(Deserialize, Clone, Debug)]
pub struct AppConfig {
    pub net_config: NetConfig,
    pub store_config: StoreConfig,
    pub db_config: DbConfig,
    pub log_config: LogConfig,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct NetConfig {
    pub host: [u8; 4],
    pub app_port: u16,
    /// Value of the `Access-Control-Allow-Origin` header, `*` unless restricted.
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Name of the table holding subscription records.
    /// A missing table is not rejected here, every store call fails instead.
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub create_table: bool,
}

#[derive(Deserialize, AsRefStr, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DbConfig {
    pub username: String,
    pub password: SecretString,
    pub port: u16,
    pub host: String,
    pub db_name: String,
    #[serde(default)]
    pub require_ssl: SslRequire,
}

#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SslRequire {
    #[default]
    Prefer,
    Require,
    Disable,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct LogConfig {
    /// Used as the tracing filter when `RUST_LOG` is not set.
    pub level: String,
}

fn default_allow_origin() -> String {
    "*".to_string()
}

// ###################################
// ->   IMPLs
// ###################################
impl NetConfig {
    pub fn allow_origin_header(&self) -> ConfigResult<HeaderValue> {
        HeaderValue::from_str(&self.allow_origin)
            .map_err(|_| ConfigError::InvalidAllowOrigin(self.allow_origin.clone()))
    }
}

impl StoreConfig {
    /// The configured table name, an empty name counts as missing.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref().filter(|t| !t.trim().is_empty())
    }
}

impl DbConfig {
    pub fn connection_options(&self) -> PgConnectOptions {
        // Create new PgConnectOptions struct but don't try to use the '$HOME/.pgpass' file.
        PgConnectOptions::new_without_pgpass()
            .host(&self.host)
            .username(&self.username)
            .password(self.password.expose_secret())
            .port(self.port)
            .database(&self.db_name)
            .ssl_mode(self.require_ssl.into())
            .log_statements(tracing::log::LevelFilter::Trace)
    }
}

impl From<SslRequire> for PgSslMode {
    fn from(value: SslRequire) -> Self {
        match value {
            SslRequire::Require => PgSslMode::Require,
            SslRequire::Disable => PgSslMode::Disable,
            SslRequire::Prefer => PgSslMode::Prefer,
        }
    }
}

// ###################################
// ->   TRY FROMs
// ###################################

impl TryFrom<String> for Environment {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            _ => Err(Self::Error::StringToEnvironmentFail),
        }
    }
}

impl TryFrom<&str> for DbConfig {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // postgres://{username}:{password}@{hostname}:{port}/{database}?{options}
        let (_whole, username, password, host, port, db_name, options) = regex_captures!(
            r#"^postgres:\/\/([^:]+):([^@]+)@([^:\/]+):(\d+)\/([^\s\/?]+)(\?[^\s]*)?$"#,
            value
        )
        .ok_or(Self::Error::StringToDbConfigFail)?;

        let port = port
            .parse()
            .map_err(|_| Self::Error::StringToDbConfigFail)?;

        let mut require_ssl = SslRequire::default();
        if let Some(options) = options.strip_prefix('?') {
            for (id, val) in options.split(['&', ',']).filter_map(|o| o.split_once('=')) {
                if id == "sslmode" {
                    match val {
                        "disable" => require_ssl = SslRequire::Disable,
                        "require" => require_ssl = SslRequire::Require,
                        _ => {}
                    }
                }
            }
        }

        Ok(DbConfig {
            username: username.to_string(),
            password: SecretString::from(password.to_string()),
            port,
            host: host.to_string(),
            db_name: db_name.to_string(),
            require_ssl,
        })
    }
}

// ###################################
// ->   TESTS
// ###################################
