pub mod app;
pub use app::run;

pub mod bridge;
pub mod config;
pub mod host;
pub mod icons;
pub mod labels;
pub mod launch;
pub mod model;

// Platform abstraction layer
pub mod platform;

// UI modules (cross-platform)
pub mod ui {
    pub mod icon;
    pub mod menu;
    pub mod process;
    pub mod settings;
    pub mod tray;
    pub mod window;
}
