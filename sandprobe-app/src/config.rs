use anyhow::{bail, Context, Result};
use sandprobe_harvest::{AppIds, BaseDirs, ProbeError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_NAME: &str = "sandprobe";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub primary_app: String,
    pub derivative_apps: Vec<String>,
    pub state_file: Option<PathBuf>,
    pub log_level: String,
    pub secret_env_vars: Vec<String>,
    pub max_listing: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            primary_app: "itch".to_string(),
            derivative_apps: vec!["kitch".to_string()],
            state_file: None,
            log_level: "warn".to_string(),
            secret_env_vars: vec!["BUTLER_API_KEY".to_string(), "ITCHIO_API_KEY".to_string()],
            max_listing: 1000,
        }
    }
}

impl AppConfig {
    /// Loads `explicit` if given, else the per-user config file if present,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    tracing::debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid YAML in {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_app_name(&self.primary_app)?;
        for app in &self.derivative_apps {
            validate_app_name(app)?;
        }
        if self.max_listing == 0 {
            bail!("max_listing must be at least 1");
        }
        self.level()?;
        Ok(())
    }

    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log_level: {}", self.log_level))
    }

    pub fn app_ids(&self) -> AppIds {
        AppIds::new(self.primary_app.clone(), self.derivative_apps.clone())
    }

    /// The configured `state_file`, else the default under app data. `dirs`
    /// is only consulted when there is no override.
    pub fn state_path<F>(&self, dirs: F) -> Result<PathBuf, ProbeError>
    where
        F: FnOnce() -> Result<BaseDirs, ProbeError>,
    {
        match &self.state_file {
            Some(path) => Ok(path.clone()),
            None => Ok(dirs()?
                .app_data
                .join(format!("{}-sandprobe", self.primary_app))
                .join(sandprobe_store::store::STATE_FILE_NAME)),
        }
    }
}

fn validate_app_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Application name must not be empty");
    }
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        bail!("Application name must be a single path component: {name}");
    }
    Ok(())
}

pub fn default_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| {
        d.config_dir()
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    })
}
