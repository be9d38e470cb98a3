//! macOS launch-at-login using SMAppService (macOS 13+) or LaunchAgent fallback

use anyhow::{Result, anyhow};
use log::{debug, warn};

fn get_macos_version() -> Result<(u32, u32)> {
    let output = std::process::Command::new("sw_vers")
        .arg("-productVersion")
        .output()?;

    let version_string = String::from_utf8(output.stdout)?;
    let mut parts = version_string.trim().split('.');

    match (parts.next(), parts.next()) {
        (Some(major), minor) => Ok((major.parse()?, minor.unwrap_or("0").parse()?)),
        _ => Err(anyhow!("Unable to parse macOS version")),
    }
}

/// SMAppService needs macOS 13.0+; older systems use a LaunchAgent plist
fn should_use_smappservice() -> bool {
    match get_macos_version() {
        Ok((major, _minor)) => {
            debug!("Detected macOS version: {}.x", major);
            major >= 13
        }
        Err(e) => {
            warn!(
                "Failed to detect macOS version: {}, falling back to LaunchAgent",
                e
            );
            false
        }
    }
}

// ============================================================================
// SMAppService Implementation (macOS 13.0+)
// ============================================================================

mod smapp {
    use anyhow::{Result, anyhow};
    use log::{debug, info, warn};
    use smappservice_rs::{AppService, ServiceStatus, ServiceType};

    pub fn enable(app_name: &str) -> Result<()> {
        debug!("Enabling launch-at-login via SMAppService");
        let app_service = AppService::new(ServiceType::MainApp);

        app_service
            .register()
            .map_err(|e| anyhow!("Failed to register with SMAppService: {}", e))?;
        info!("Registered with SMAppService");

        if app_service.status() == ServiceStatus::RequiresApproval {
            warn!("Launch-at-login requires user approval in System Settings");
            AppService::open_system_settings_login_items();
            return Err(anyhow!(
                "Please approve {} in System Settings > Login Items",
                app_name
            ));
        }
        Ok(())
    }

    pub fn disable() -> Result<()> {
        debug!("Disabling launch-at-login via SMAppService");
        AppService::new(ServiceType::MainApp)
            .unregister()
            .map_err(|e| anyhow!("Failed to unregister from SMAppService: {}", e))
    }

    pub fn is_enabled() -> Result<bool> {
        let status = AppService::new(ServiceType::MainApp).status();
        // RequiresApproval still counts as registered
        Ok(status == ServiceStatus::Enabled || status == ServiceStatus::RequiresApproval)
    }
}

// ============================================================================
// LaunchAgent Implementation (Fallback for macOS < 13.0)
// ============================================================================

mod launchagent {
    use anyhow::{Result, anyhow};
    use auto_launch::AutoLaunchBuilder;
    use log::{debug, info};

    fn get_auto_launch(app_name: &str) -> Result<auto_launch::AutoLaunch> {
        let exe_path = std::env::current_exe()?;
        let app_path = exe_path
            .to_str()
            .ok_or_else(|| anyhow!("Invalid executable path"))?;

        AutoLaunchBuilder::new()
            .set_app_name(app_name)
            .set_app_path(app_path)
            .set_use_launch_agent(true)
            .build()
            .map_err(|e| anyhow!("Failed to create auto-launch config: {}", e))
    }

    pub fn enable(app_name: &str) -> Result<()> {
        debug!("Enabling launch-at-login via LaunchAgent");
        get_auto_launch(app_name)?
            .enable()
            .map_err(|e| anyhow!("Failed to enable LaunchAgent: {}", e))?;
        info!("Enabled launch-at-login via LaunchAgent");
        Ok(())
    }

    pub fn disable(app_name: &str) -> Result<()> {
        debug!("Disabling launch-at-login via LaunchAgent");
        get_auto_launch(app_name)?
            .disable()
            .map_err(|e| anyhow!("Failed to disable LaunchAgent: {}", e))
    }

    pub fn is_enabled(app_name: &str) -> Result<bool> {
        get_auto_launch(app_name)?
            .is_enabled()
            .map_err(|e| anyhow!("Failed to check LaunchAgent status: {}", e))
    }
}

// ============================================================================
// Public API
// ============================================================================

pub fn enable_launch_at_login(app_name: &str) -> Result<()> {
    if should_use_smappservice() {
        smapp::enable(app_name)
    } else {
        launchagent::enable(app_name)
    }
}

pub fn disable_launch_at_login(app_name: &str) -> Result<()> {
    if should_use_smappservice() {
        smapp::disable()
    } else {
        launchagent::disable(app_name)
    }
}

pub fn is_launch_at_login_enabled(app_name: &str) -> Result<bool> {
    if should_use_smappservice() {
        smapp::is_enabled()
    } else {
        launchagent::is_enabled(app_name)
    }
}
