//! Windows launch-at-login using Registry

use std::io;

use anyhow::{Context, Result};
use winreg::RegKey;
use winreg::enums::*;

const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Enables launch-at-login by adding to registry Run key
pub fn enable_launch_at_login(app_name: &str) -> Result<()> {
    let exe_path = std::env::current_exe().context("failed to resolve executable path")?;
    let path_str = format!("\"{}\"", exe_path.to_string_lossy());

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let (key, _) = hkcu
        .create_subkey(RUN_KEY)
        .context("failed to open registry Run key")?;
    key.set_value(app_name, &path_str)
        .with_context(|| format!("failed to write Run entry for {app_name}"))?;

    log::info!("Enabled launch-at-login via registry: {}", path_str);
    Ok(())
}

/// Disables launch-at-login by removing from registry Run key
pub fn disable_launch_at_login(app_name: &str) -> Result<()> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);

    let key = hkcu.open_subkey_with_flags(RUN_KEY, KEY_WRITE);
    let Some(key) = missing_is_none(key).context("failed to open registry Run key")? else {
        log::debug!("Registry Run key not found (already disabled)");
        return Ok(());
    };
    missing_is_none(key.delete_value(app_name))
        .with_context(|| format!("failed to remove Run entry for {app_name}"))?;
    log::info!("Disabled launch-at-login");
    Ok(())
}

/// A missing key or value already means disabled; anything else is a failure.
fn missing_is_none<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// Checks if launch-at-login is currently enabled
pub fn is_launch_at_login_enabled(app_name: &str) -> Result<bool> {
    let hkcu = RegKey::predef(HKEY_CURRENT_USER);

    let key = match hkcu.open_subkey(RUN_KEY) {
        Ok(k) => k,
        Err(_) => return Ok(false),
    };

    Ok(key.get_value::<String, _>(app_name).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entries_count_as_disabled() {
        let missing: io::Result<()> = Err(io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(missing_is_none(missing), Ok(None)));
        assert!(matches!(missing_is_none(Ok(5)), Ok(Some(5))));
    }

    #[test]
    fn other_registry_errors_are_reported() {
        let denied: io::Result<()> = Err(io::Error::from(io::ErrorKind::PermissionDenied));
        let err = missing_is_none(denied).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
