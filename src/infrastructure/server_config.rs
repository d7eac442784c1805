use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};

/// Server-side settings. The data pipeline itself takes no configuration
/// beyond `PrepareConfig` defaults; this only covers where the HTTP
/// boundary binds and where exports land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub export_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl ServerConfig {
    /// Load configuration: defaults, overridden by an optional
    /// `hotelscope.toml`, overridden by `HOTELSCOPE_*` environment
    /// variables. Everything has a default, so running with no
    /// configuration at all works.
    pub fn load() -> Result<Self> {
        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file("hotelscope.toml"))
            .merge(Env::prefixed("HOTELSCOPE_"))
            .extract()
            .map_err(|e| AppError::ValidationError(format!("Invalid server config: {}", e)))
    }

    pub fn bind_addr(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
