//! Linux launch-at-login using an XDG autostart entry

use anyhow::{Context, Result, anyhow};
use auto_launch::{AutoLaunch, AutoLaunchBuilder};
use log::{debug, info};

fn get_auto_launch(app_name: &str) -> Result<AutoLaunch> {
    let exe_path = std::env::current_exe().context("failed to resolve executable path")?;
    let app_path = exe_path
        .to_str()
        .ok_or_else(|| anyhow!("Invalid executable path"))?;

    AutoLaunchBuilder::new()
        .set_app_name(app_name)
        .set_app_path(app_path)
        .build()
        .map_err(|e| anyhow!("Failed to create auto-launch config: {}", e))
}

pub fn enable_launch_at_login(app_name: &str) -> Result<()> {
    debug!("Enabling launch-at-login via XDG autostart");
    get_auto_launch(app_name)?
        .enable()
        .map_err(|e| anyhow!("Failed to write autostart entry: {}", e))?;
    info!("Enabled launch-at-login via XDG autostart");
    Ok(())
}

pub fn disable_launch_at_login(app_name: &str) -> Result<()> {
    debug!("Disabling launch-at-login via XDG autostart");
    get_auto_launch(app_name)?
        .disable()
        .map_err(|e| anyhow!("Failed to remove autostart entry: {}", e))?;
    info!("Disabled launch-at-login");
    Ok(())
}

pub fn is_launch_at_login_enabled(app_name: &str) -> Result<bool> {
    get_auto_launch(app_name)?
        .is_enabled()
        .map_err(|e| anyhow!("Failed to check autostart entry: {}", e))
}
