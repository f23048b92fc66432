use crate::error::{RuntimeError, RuntimeResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for a datagate node instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Path where the node stores its row data.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Address the HTTP host binds to.
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("datagate"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn default_listen_address() -> String {
    "127.0.0.1:9001".to_string()
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            listen_address: default_listen_address(),
        }
    }
}

/// Loads node settings from a TOML file.
///
/// Resolution order: the explicit `path` argument, then the
/// `DATAGATE_CONFIG` environment variable, then `config/datagate.toml`.
/// A missing file is not an error; defaults apply.
pub fn load_settings(path: Option<&Path>) -> RuntimeResult<NodeSettings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => std::env::var("DATAGATE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/datagate.toml")),
    };

    if !path.exists() {
        return Ok(NodeSettings::default());
    }

    let raw = std::fs::read_to_string(&path).map_err(|e| {
        RuntimeError::Config(format!("failed to read '{}': {}", path.display(), e))
    })?;
    toml::from_str(&raw).map_err(|e| {
        RuntimeError::Config(format!("failed to parse '{}': {}", path.display(), e))
    })
}
