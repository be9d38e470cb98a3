pub mod launch;
pub mod tray;
