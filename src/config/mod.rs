//! Builds the `AppConfig` from layered sources.
//! `config/base.toml` is overridden by the environment specific file (`local.toml` or `production.toml`),
//! which is in turn overridden by `APP_` prefixed environment variables, e.g. `APP_STORE_CONFIG__TABLE`.

mod error;
mod types;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

// Re-export config structs
pub use error::{ConfigError, ConfigResult};
pub use types::{
    AppConfig, DbConfig, Environment, LogConfig, NetConfig, SslRequire, StoreBackend, StoreConfig,
};

impl AppConfig {
    /// Loads the configuration from the `config` directory in the current working directory.
    /// The environment is taken from `APP_ENVIRONMENT` and defaults to `local`.
    /// In production a `DATABASE_URL` env variable, if present, replaces the configured `DbConfig`.
    ///
    /// Runs before tracing is initialized (the log level is part of the config) so it doesn't log.
    pub fn load() -> ConfigResult<Self> {
        let config_dir = std::env::current_dir()?.join("config");

        let environment: Environment = std::env::var("APP_ENVIRONMENT")
            .unwrap_or_else(|_| "local".into())
            .try_into()?;

        let mut config: AppConfig = Self::figment(&config_dir, &environment).extract()?;

        if matches!(environment, Environment::Production) {
            if let Ok(production_db) = std::env::var("DATABASE_URL") {
                config.db_config = DbConfig::try_from(production_db.as_str())?;
            }
        }

        Ok(config)
    }

    /// The layered configuration sources, without extracting them.
    pub fn figment(config_dir: &Path, environment: &Environment) -> Figment {
        let environment_filename = format!("{}.toml", environment.as_ref().to_lowercase());

        Figment::new()
            .merge(Toml::file(config_dir.join("base.toml")))
            .merge(Toml::file(config_dir.join(environment_filename)))
            .merge(Env::prefixed("APP_").ignore(&["environment"]).split("__"))
    }
}
