use std::env;
use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::configs::normalize_path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Logger {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    pub migration_path: Option<String>,
    pub clean_start: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auth {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: Server,
    pub logger: Logger,
    pub database: Database,
    pub auth: Auth,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or("development".into());

        let settings = Config::builder()
            .add_source(File::with_name("configs/default"))
            .add_source(File::with_name(&format!("configs/{run_mode}")).required(false))
            .add_source(Self::environment())
            .build()?
            .try_deserialize()?;

        Self::normalize(settings)
    }

    /// `HOMESIM_DATABASE__CLEAN_START=true` overrides `database.clean_start`.
    fn environment() -> Environment {
        Environment::with_prefix("HOMESIM")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    fn normalize(mut settings: Settings) -> Result<Self, ConfigError> {
        if let Some(migrate) = &settings.database.migration_path {
            let migrate_path = normalize_path(migrate).map_err(|e| ConfigError::Message(e.to_string()))?;

            settings.database.migration_path = if Path::new(&migrate_path).is_dir() {
                Some(migrate_path.to_string_lossy().to_string())
            } else {
                tracing::warn!("migration path {:?} is not a directory, skipping migrations", migrate_path);
                None
            };
        }

        Ok(settings)
    }
}
