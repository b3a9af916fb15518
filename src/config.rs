//! Server configuration.
//!
//! Built-in defaults, overlaid by an optional YAML file named in
//! `VHOSTD_CONFIG`, overlaid by the `LISTEN` and `ROOT_FOLDER`
//! environment variables.
//!
//! ```yaml
//! log_level: debug
//! server:
//!   listen_addr: 0.0.0.0:8080
//!   max_connections: 256
//!   read_timeout_secs: 10
//! files:
//!   root_folder: /srv/www
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub files: FilesConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Connections served at once; further ones wait in the accept backlog
    pub max_connections: usize,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub max_header_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory holding one subdirectory per virtual host
    pub root_folder: PathBuf,
}

/// What each connection needs to know, cloned into every connection task.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub root_folder: PathBuf,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_header_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            files: FilesConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1024,
            read_timeout_secs: 30,
            write_timeout_secs: 30,
            max_header_bytes: crate::http::parser::DEFAULT_MAX_HEADER_BYTES,
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root_folder: PathBuf::from("./www"),
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Config::default().settings()
    }
}

impl Config {
    /// Loads the configuration from the process environment.
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let mut cfg = match var("VHOSTD_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(listen_addr) = var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }
        if let Some(root_folder) = var("ROOT_FOLDER") {
            cfg.files.root_folder = PathBuf::from(root_folder);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("in config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw).context("invalid configuration")?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn settings(&self) -> ServerSettings {
        ServerSettings {
            root_folder: self.files.root_folder.clone(),
            read_timeout: Duration::from_secs(self.server.read_timeout_secs),
            write_timeout: Duration::from_secs(self.server.write_timeout_secs),
            max_header_bytes: self.server.max_header_bytes,
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_connections == 0 {
            bail!("server.max_connections must be at least 1");
        }
        if self.server.max_header_bytes == 0 {
            bail!("server.max_header_bytes must be at least 1");
        }
        if self.server.read_timeout_secs == 0 || self.server.write_timeout_secs == 0 {
            bail!("server timeouts must be at least one second");
        }
        self.log_level()?;
        Ok(())
    }
}
