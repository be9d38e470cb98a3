//! Main window lifecycle: closing hides to the tray unless the app is quitting.

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowId};

use crate::config::WindowConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// What the event loop must do after a close request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseAction {
    Hide,
    Exit,
}

#[derive(Debug)]
pub struct WindowState {
    visibility: Visibility,
    quitting: bool,
}

impl Default for WindowState {
    fn default() -> Self {
        Self {
            visibility: Visibility::Visible,
            quitting: false,
        }
    }
}

impl WindowState {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_quitting(&self) -> bool {
        self.quitting
    }

    pub fn on_close_requested(&mut self) -> CloseAction {
        if self.quitting {
            CloseAction::Exit
        } else {
            self.visibility = Visibility::Hidden;
            CloseAction::Hide
        }
    }

    pub fn show(&mut self) {
        self.visibility = Visibility::Visible;
    }

    pub fn begin_quit(&mut self) {
        self.quitting = true;
    }
}

/// The OS window paired with its visibility state.
pub struct MainWindow {
    config: WindowConfig,
    window: Option<Window>,
    state: WindowState,
}

impl MainWindow {
    pub fn new(config: WindowConfig) -> Self {
        Self {
            config,
            window: None,
            state: WindowState::default(),
        }
    }

    pub fn is(&self, id: WindowId) -> bool {
        self.window.as_ref().is_some_and(|w| w.id() == id)
    }

    /// Creates the window on first activation; re-shows it when hidden afterwards.
    pub fn activate(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.window.is_none() {
            let attributes = Window::default_attributes()
                .with_title(self.config.title.as_str())
                .with_inner_size(LogicalSize::new(
                    self.config.width as f64,
                    self.config.height as f64,
                ));
            let window = event_loop
                .create_window(attributes)
                .context("failed to create main window")?;
            self.window = Some(window);
            self.state.show();
        } else if self.state.visibility() == Visibility::Hidden {
            self.show();
        }
        Ok(())
    }

    pub fn show(&mut self) {
        self.state.show();
        if let Some(window) = &self.window {
            window.set_visible(true);
            window.focus_window();
        }
    }

    pub fn close_requested(&mut self) -> CloseAction {
        let action = self.state.on_close_requested();
        if action == CloseAction::Hide
            && let Some(window) = &self.window
        {
            window.set_visible(false);
        }
        action
    }

    pub fn begin_quit(&mut self) {
        self.state.begin_quit();
    }

    pub fn destroyed(&mut self) {
        self.window = None;
    }

    pub fn apply_config(&mut self, config: WindowConfig) {
        if let Some(window) = &self.window {
            window.set_title(&config.title);
        }
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_visible_and_not_quitting() {
        let state = WindowState::default();
        assert_eq!(state.visibility(), Visibility::Visible);
        assert!(!state.is_quitting());
    }

    #[test]
    fn close_hides_while_running() {
        let mut state = WindowState::default();
        assert_eq!(state.on_close_requested(), CloseAction::Hide);
        assert_eq!(state.visibility(), Visibility::Hidden);
        // A second close on a hidden window still keeps the process alive
        assert_eq!(state.on_close_requested(), CloseAction::Hide);
    }

    #[test]
    fn close_exits_after_quit_begins() {
        let mut state = WindowState::default();
        state.begin_quit();
        assert_eq!(state.on_close_requested(), CloseAction::Exit);
    }

    #[test]
    fn show_returns_hidden_window_to_visible() {
        let mut state = WindowState::default();
        state.on_close_requested();
        state.show();
        assert_eq!(state.visibility(), Visibility::Visible);
    }
}
