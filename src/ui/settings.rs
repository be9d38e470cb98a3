//! User settings form: profile fields plus the start-on-boot toggle.

use std::sync::{Arc, PoisonError, RwLock};

use log::error;

use crate::bridge::HostApi;

pub const INTRO_TEXT: &str = "This is a simple tool that allows you to design, test, and banter \
with custom AI characters on the fly.";
pub const OPTIONAL_INFO_TEXT: &str = "Adding this optional info makes the experience more fun:";
pub const NAME_LABEL: &str = "Your name";
pub const NAME_PLACEHOLDER: &str = "What do you like to be called?";
pub const INFO_LABEL: &str = "Your info";
pub const INFO_PLACEHOLDER: &str = "Things we should know about you… Likes, dislikes, hobbies, \
interests, favorite movies, books, tv shows, foods, etc.";
pub const AUTO_LAUNCH_LABEL: &str = "Start app on boot";
pub const AUTO_LAUNCH_HINT: &str = "Automatically launch the app when your computer starts";
pub const SUBMIT_LABEL: &str = "Let’s go!";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub name: String,
    pub info: String,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub profile: UserProfile,
    pub show_user_config: bool,
}

pub type SharedUiState = Arc<RwLock<UiState>>;

pub fn shared_ui_state() -> SharedUiState {
    Arc::new(RwLock::new(UiState::default()))
}

/// Form model behind the settings modal.
///
/// Profile fields live in the shared UI state; the auto-launch toggle is local
/// display state kept in sync with the host.
pub struct SettingsForm<H: HostApi> {
    host: H,
    ui: SharedUiState,
    auto_launch_available: bool,
    auto_launch_enabled: bool,
    last_error: Option<String>,
}

impl<H: HostApi> SettingsForm<H> {
    pub fn new(host: H, ui: SharedUiState) -> Self {
        Self {
            host,
            ui,
            auto_launch_available: false,
            auto_launch_enabled: false,
            last_error: None,
        }
    }

    /// Asks the host whether auto-launch exists here. A failed query leaves the toggle hidden.
    pub fn on_mount(&mut self) {
        match self.host.get_auto_launch_status() {
            Ok(status) => {
                self.auto_launch_available = status.available;
                self.auto_launch_enabled = status.enabled;
            }
            Err(e) => {
                error!("Failed to query auto-launch status: {:#}", e);
                self.auto_launch_available = false;
            }
        }
    }

    /// Shows the new value immediately and rolls it back if the host refuses.
    pub fn on_toggle(&mut self, checked: bool) {
        let previous = self.auto_launch_enabled;
        self.auto_launch_enabled = checked;

        let failure = match self.host.set_auto_launch(checked) {
            Ok(result) if result.success => None,
            Ok(result) => Some(result.error.unwrap_or_else(|| "unknown error".to_string())),
            Err(e) => Some(format!("{:#}", e)),
        };

        match failure {
            None => self.last_error = None,
            Some(message) => {
                error!("Failed to set auto-launch: {}", message);
                self.auto_launch_enabled = previous;
                self.last_error = Some(message);
            }
        }
    }

    pub fn shows_auto_launch_toggle(&self) -> bool {
        self.auto_launch_available
    }

    pub fn auto_launch_enabled(&self) -> bool {
        self.auto_launch_enabled
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn profile(&self) -> UserProfile {
        self.ui
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .profile
            .clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.with_state(|state| state.profile.name = name.into());
    }

    pub fn set_info(&self, info: impl Into<String>) {
        self.with_state(|state| state.profile.info = info.into());
    }

    /// Nothing is persisted here; submitting just dismisses the view.
    pub fn submit(&self) {
        self.close();
    }

    pub fn close(&self) {
        self.with_state(|state| state.show_user_config = false);
    }

    fn with_state(&self, f: impl FnOnce(&mut UiState)) {
        let mut state = self.ui.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut state);
    }
}
