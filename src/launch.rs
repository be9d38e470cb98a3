//! Auto-launch capability behind a trait so the host can run without it.

use anyhow::Result;

/// OS registration that starts the application at user login.
pub trait Launcher {
    fn enable(&self) -> Result<()>;
    fn disable(&self) -> Result<()>;
    fn is_enabled(&self) -> Result<bool>;
}

/// Launcher backed by the current platform's login-item mechanism.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    app_name: String,
}

#[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
mod system {
    use anyhow::Result;

    use super::{Launcher, SystemLauncher};
    use crate::platform::current::launch::{
        disable_launch_at_login, enable_launch_at_login, is_launch_at_login_enabled,
    };

    impl SystemLauncher {
        pub fn new(app_name: &str) -> Result<Self> {
            // Resolve the executable up front so a broken install reports unavailable
            std::env::current_exe()?;
            Ok(Self {
                app_name: app_name.to_string(),
            })
        }
    }

    impl Launcher for SystemLauncher {
        fn enable(&self) -> Result<()> {
            enable_launch_at_login(&self.app_name)
        }

        fn disable(&self) -> Result<()> {
            disable_launch_at_login(&self.app_name)
        }

        fn is_enabled(&self) -> Result<bool> {
            is_launch_at_login_enabled(&self.app_name)
        }
    }
}

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
mod system {
    use anyhow::{Result, bail};

    use super::{Launcher, SystemLauncher};

    impl SystemLauncher {
        pub fn new(app_name: &str) -> Result<Self> {
            bail!("launch at login is not supported on this platform ({app_name})")
        }
    }

    impl Launcher for SystemLauncher {
        fn enable(&self) -> Result<()> {
            bail!("launch at login is not supported on this platform")
        }

        fn disable(&self) -> Result<()> {
            bail!("launch at login is not supported on this platform")
        }

        fn is_enabled(&self) -> Result<bool> {
            Ok(false)
        }
    }
}

/// Builds the launcher for this process, or `None` when the capability is off.
///
/// Development builds never register themselves; the path would point at a
/// throwaway build artifact.
pub fn create_launcher(app_name: &str, dev_mode: bool) -> Option<Box<dyn Launcher>> {
    if dev_mode {
        log::info!("Auto-launch disabled in development mode");
        return None;
    }
    match SystemLauncher::new(app_name) {
        Ok(launcher) => Some(Box::new(launcher)),
        Err(e) => {
            log::warn!("Auto-launch not available on this platform: {}", e);
            None
        }
    }
}
