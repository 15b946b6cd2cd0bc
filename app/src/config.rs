use std::collections::HashMap;
use std::path::PathBuf;

use log::*;
use serde::{Deserialize, Serialize};

use infra::persistence::{Documents, StorageError};

const ENV_PREFIX: &str = "BAZAAR_";

#[derive(Deserialize, Serialize, Debug, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct StorageConfig {
    pub path: PathBuf,
}

/// Settings taken from `BAZAAR_*` environment variables.
#[derive(Deserialize, Debug, Default)]
pub struct EnvOverrides {
    data_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "lowercase")]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from("."),
        }
    }
}

impl StorageConfig {
    pub(crate) fn build(&self) -> Result<Documents, StorageError> {
        debug!("Build documents from {:?}", self);
        Documents::open(&self.path)
    }
}

impl Config {
    pub fn apply(&mut self, overrides: EnvOverrides) {
        if let Some(path) = overrides.data_dir {
            debug!("Data directory from environment: {:?}", path);
            self.storage.path = path;
        }
    }
}

impl EnvOverrides {
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed(ENV_PREFIX).from_env()
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct EnvLogger {
    #[serde(default)]
    level: Option<LogLevel>,
    #[serde(default)]
    modules: HashMap<String, LogLevel>,
    #[serde(default)]
    timestamp_nanos: bool,
}

impl LogLevel {
    fn to_filter(&self) -> LevelFilter {
        match *self {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

impl EnvLogger {
    pub fn builder(&self) -> env_logger::Builder {
        let mut b = env_logger::Builder::from_default_env();
        if let Some(level) = self.level.as_ref() {
            b.filter_level(level.to_filter());
        }
        for (module, level) in self.modules.iter() {
            b.filter_module(module, level.to_filter());
        }
        if self.timestamp_nanos {
            b.format_timestamp_nanos();
        }
        b
    }
}
