use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::labels::TrayLabels;

/// Internal application name: tray tooltip default and auto-launch entry.
pub const APP_NAME: &str = "aman";
/// Human-readable name exposed to the UI through the bridge.
pub const APP_DISPLAY_NAME: &str = "Conversational AI Voice App";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug)]
pub enum UserEvent {
    MenuAction(MenuAction),
    TrayDoubleClick,
    ConfigReloaded(Config),
    ConfigReloadFailed(String),
    UiProcessExited(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    Show,
    Quit,
}

/// Outcome of a mutating bridge call that carries no payload.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct OperationResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OperationResult {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AutoLaunchStatus {
    pub available: bool,
    pub enabled: bool,
}

impl AutoLaunchStatus {
    pub fn unavailable() -> Self {
        Self::default()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrayLabelsResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<TrayLabels>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TrayLabelsResult {
    pub fn ok(labels: TrayLabels) -> Self {
        Self {
            success: true,
            labels: Some(labels),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            labels: None,
            error: Some(message.into()),
        }
    }
}

/// Host-side message handed back to the bridge caller.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Response {
    AutoLaunch(OperationResult),
    AutoLaunchStatus(AutoLaunchStatus),
    TrayLabels(TrayLabelsResult),
}
