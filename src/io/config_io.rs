use std::fs;
use std::path::{Path, PathBuf};

use crate::model::AppConfig;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Load deck.toml from `dir`. A missing file is not an error: every section
/// has defaults. A present-but-broken file is an error, not a silent reset.
pub fn load_config(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join("deck.toml");
    let text = match fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(AppConfig::default()),
        Err(e) => {
            return Err(ConfigError::Read {
                path,
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::Parse { path, source: e })
}
