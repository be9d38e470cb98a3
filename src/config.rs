use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::labels::TrayLabelsUpdate;

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub content: ContentConfig,
    #[serde(default)]
    pub auto_launch: AutoLaunchConfig,
    #[serde(default)]
    pub tray: TrayConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width: u32,
    #[serde(default = "default_window_height")]
    pub height: u32,
    #[serde(default = "default_window_title")]
    pub title: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ContentConfig {
    #[serde(default = "default_dev_url")]
    pub dev_url: String,
    /// Built UI entry point, relative to the executable's directory.
    #[serde(default = "default_dist_index")]
    pub dist_index: PathBuf,
    /// Optional UI process spoken to over stdin/stdout with the bridge protocol.
    #[serde(default)]
    pub ui_command: Option<Vec<String>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct AutoLaunchConfig {
    #[serde(default)]
    pub enable_on_first_run: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct TrayConfig {
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
    #[serde(default)]
    pub labels: Option<TrayLabelsUpdate>,
}

// Defaults for WindowConfig
fn default_window_width() -> u32 {
    1200
}

fn default_window_height() -> u32 {
    800
}

fn default_window_title() -> String {
    crate::model::APP_NAME.to_string()
}

// Defaults for ContentConfig
fn default_dev_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_dist_index() -> PathBuf {
    PathBuf::from("dist").join("index.html")
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_window_width(),
            height: default_window_height(),
            title: default_window_title(),
        }
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            dev_url: default_dev_url(),
            dist_index: default_dist_index(),
            ui_command: None,
        }
    }
}

impl ContentConfig {
    /// URL the UI loads: the dev server in development, the bundled index otherwise.
    pub fn start_url(&self, dev_mode: bool, exe_dir: &Path) -> String {
        if dev_mode {
            self.dev_url.clone()
        } else {
            let index = if self.dist_index.is_absolute() {
                self.dist_index.clone()
            } else {
                exe_dir.join(&self.dist_index)
            };
            format!("file://{}", index.to_string_lossy().replace('\\', "/"))
        }
    }
}

/// Development mode: debug builds, `AMAN_DEV`, or a non-production `NODE_ENV`.
pub fn is_dev_mode() -> bool {
    dev_mode_from(
        cfg!(debug_assertions),
        std::env::var_os("AMAN_DEV").is_some(),
        std::env::var("NODE_ENV").ok().as_deref(),
    )
}

fn dev_mode_from(debug_build: bool, dev_flag: bool, node_env: Option<&str>) -> bool {
    debug_build || dev_flag || node_env.is_some_and(|env| env != "production")
}

pub fn get_config_path() -> PathBuf {
    let base = dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    base.join(crate::model::APP_NAME).join("config.json")
}

pub fn load_or_create_config() -> Result<Config> {
    load_or_create_config_at(&get_config_path())
}

pub fn load_or_create_config_at(path: &Path) -> Result<Config> {
    if path.exists() {
        load_and_validate_config_at(path)
    } else {
        let config = Config::default();
        save_config_at(&config, path)?;
        Ok(config)
    }
}

pub fn load_and_validate_config() -> Result<Config> {
    load_and_validate_config_at(&get_config_path())
}

pub fn load_and_validate_config_at(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).context("failed to read config file")?;
    let config = serde_json::from_str::<Config>(&content).context("failed to parse config file")?;
    validate_config(&config)?;
    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.window.width == 0 || config.window.height == 0 {
        bail!(
            "window size must be non-zero (got {}x{})",
            config.window.width,
            config.window.height
        );
    }
    if config.content.dev_url.trim().is_empty() {
        bail!("content.dev_url must not be empty");
    }
    if let Some(command) = &config.content.ui_command
        && command.first().is_none_or(|program| program.trim().is_empty())
    {
        bail!("content.ui_command must name a program");
    }
    Ok(())
}

pub fn save_config_at(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    let content = serde_json::to_string_pretty(config).context("failed to serialize config")?;
    fs::write(path, content).context("failed to write config file")?;
    Ok(())
}
