use std::{fs, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub name: String,
    pub env: String,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

fn default_database_path() -> String {
    "data/tripboard.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripboardConfig {
    pub app: AppConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

impl TripboardConfig {
    /// Database location; relative paths hang off the project root.
    pub fn database_path(&self, root: &Path) -> PathBuf {
        let path = Path::new(&self.storage.database_path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            root.join(path)
        }
    }
}

pub const SKELETON_MAIN_YAML: &str = "\
app:
  name: tripboard
  env: dev
server:
  bind: 127.0.0.1
  port: 3000
storage:
  database_path: data/tripboard.db
";

pub fn resolve_env_var(raw: &str) -> String {
    let mut output = String::new();
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);

        let candidate = &rest[start + 2..];
        let Some(end) = candidate.find('}') else {
            output.push_str(&rest[start..]);
            return output;
        };

        let key = &candidate[..end];
        output.push_str(&std::env::var(key).unwrap_or_default());
        rest = &candidate[end + 1..];
    }

    output.push_str(rest);
    output
}

/// Load `main.yaml` from `config_dir`, expand `${VAR}` placeholders and
/// validate the result.
pub fn load_config(config_dir: &Path) -> Result<TripboardConfig> {
    let path = config_dir.join("main.yaml");
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;
    let mut config: TripboardConfig = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse yaml file: {}", path.display()))?;

    config.app.name = resolve_env_var(&config.app.name);
    config.app.env = resolve_env_var(&config.app.env);
    config.server.bind = resolve_env_var(&config.server.bind);
    config.storage.database_path = resolve_env_var(&config.storage.database_path);

    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &TripboardConfig) -> Result<()> {
    if config.server.port == 0 {
        return Err(anyhow!("server.port must be non-zero"));
    }
    if config.server.bind.trim().is_empty() {
        return Err(anyhow!("server.bind must not be empty"));
    }
    if config.storage.database_path.trim().is_empty() {
        return Err(anyhow!("storage.database_path must not be empty"));
    }
    Ok(())
}

/// Write a default `main.yaml` unless one exists. Returns whether a file was
/// written.
pub fn ensure_skeleton_config(config_dir: &Path) -> Result<bool> {
    let path = config_dir.join("main.yaml");
    if path.exists() {
        return Ok(false);
    }
    fs::create_dir_all(config_dir)
        .with_context(|| format!("failed to create config dir: {}", config_dir.display()))?;
    fs::write(&path, SKELETON_MAIN_YAML)
        .with_context(|| format!("failed to write config file: {}", path.display()))?;
    Ok(true)
}
