use std::path::Path;

use anyhow::{Context, Result};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

use crate::labels::TrayLabels;
use crate::ui::menu::build_menu;

/// Anything that can present the tray labels.
pub trait TrayView {
    fn apply_labels(&self, labels: &TrayLabels) -> Result<()>;
}

/// The application's single status-area icon.
pub struct Tray {
    icon: TrayIcon,
}

impl Tray {
    pub fn new(icon: Icon, labels: &TrayLabels) -> Result<Self> {
        let menu = build_menu(labels).context("failed to build initial menu")?;
        let icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_menu(Box::new(menu))
            .with_tooltip(&labels.tooltip)
            .build()
            .context("failed to create tray icon")?;
        icon.set_visible(true)
            .context("failed to show tray icon")?;
        Ok(Self { icon })
    }
}

impl TrayView for Tray {
    fn apply_labels(&self, labels: &TrayLabels) -> Result<()> {
        let menu = build_menu(labels).context("failed to rebuild menu")?;
        self.icon.set_menu(Some(Box::new(menu)));
        self.icon
            .set_tooltip(Some(labels.tooltip.as_str()))
            .context("failed to update tooltip")?;
        log::debug!("Tray labels applied: {:?}", labels);
        Ok(())
    }
}

/// Tray as created for this platform: in-thread everywhere except Linux,
/// where it runs on its own GTK thread.
#[cfg(not(target_os = "linux"))]
pub type SystemTray = Tray;

#[cfg(target_os = "linux")]
pub type SystemTray = crate::platform::linux::tray::GtkTray;

#[cfg(not(target_os = "linux"))]
pub fn create_tray(icon_path: Option<&Path>, labels: &TrayLabels) -> Result<SystemTray> {
    let icon = crate::ui::icon::load_tray_icon(icon_path)
        .context("failed to create tray icon image")?;
    Tray::new(icon, labels)
}

#[cfg(target_os = "linux")]
pub fn create_tray(icon_path: Option<&Path>, labels: &TrayLabels) -> Result<SystemTray> {
    crate::platform::linux::tray::GtkTray::spawn(icon_path.map(Path::to_path_buf), labels.clone())
}
