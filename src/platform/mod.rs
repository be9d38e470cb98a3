//! Platform abstraction layer
//!
//! Each supported OS provides a `launch` module that registers the current
//! executable to start at user login.

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "linux")]
pub mod linux;

// Re-export the current platform's modules
#[cfg(target_os = "macos")]
pub use macos as current;

#[cfg(target_os = "windows")]
pub use windows as current;

#[cfg(target_os = "linux")]
pub use linux as current;
