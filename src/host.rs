//! Request handlers of the privileged host process.
//!
//! Every handler converts internal failures into a structured response; nothing
//! here returns an error across the bridge boundary.

use log::{debug, error, info, warn};

use crate::bridge::Request;
use crate::labels::{LabelStore, TrayLabels, TrayLabelsUpdate};
use crate::launch::Launcher;
use crate::model::{AutoLaunchStatus, OperationResult, Response, TrayLabelsResult};
use crate::ui::tray::TrayView;

const LAUNCHER_UNAVAILABLE: &str = "Auto-launcher not available";

pub struct Host {
    launcher: Option<Box<dyn Launcher>>,
    labels: LabelStore,
}

impl Host {
    pub fn new(launcher: Option<Box<dyn Launcher>>, labels: TrayLabels) -> Self {
        Self {
            launcher,
            labels: LabelStore::new(labels),
        }
    }

    pub fn labels(&self) -> TrayLabels {
        self.labels.get()
    }

    pub fn launcher(&self) -> Option<&dyn Launcher> {
        self.launcher.as_deref()
    }

    pub fn handle(&self, request: Request, tray: &dyn TrayView) -> Response {
        match request {
            Request::SetAutoLaunch(enabled) => Response::AutoLaunch(self.set_auto_launch(enabled)),
            Request::GetAutoLaunchStatus => {
                Response::AutoLaunchStatus(self.auto_launch_status())
            }
            Request::SetTrayLabels(update) => {
                Response::TrayLabels(self.set_tray_labels(&update, tray))
            }
            Request::GetTrayLabels => Response::TrayLabels(self.tray_labels()),
            Request::ResetTrayLabels => Response::TrayLabels(self.reset_tray_labels(tray)),
        }
    }

    pub fn set_auto_launch(&self, enabled: bool) -> OperationResult {
        let Some(launcher) = self.launcher() else {
            return OperationResult::failed(LAUNCHER_UNAVAILABLE);
        };
        let result = if enabled {
            launcher.enable()
        } else {
            launcher.disable()
        };
        match result {
            Ok(()) => {
                info!(
                    "Auto-launch {}",
                    if enabled { "enabled" } else { "disabled" }
                );
                OperationResult::ok()
            }
            Err(e) => {
                error!("Error setting auto-launch: {:#}", e);
                OperationResult::failed(e.to_string())
            }
        }
    }

    /// Reports the capability without touching the registration.
    pub fn auto_launch_status(&self) -> AutoLaunchStatus {
        let Some(launcher) = self.launcher() else {
            return AutoLaunchStatus::unavailable();
        };
        match launcher.is_enabled() {
            Ok(enabled) => AutoLaunchStatus {
                available: true,
                enabled,
            },
            Err(e) => {
                error!("Error getting auto-launch status: {:#}", e);
                AutoLaunchStatus {
                    available: true,
                    enabled: false,
                }
            }
        }
    }

    pub fn set_tray_labels(&self, update: &TrayLabelsUpdate, tray: &dyn TrayView) -> TrayLabelsResult {
        match self.labels.apply(update, |labels| tray.apply_labels(labels)) {
            Ok(labels) => TrayLabelsResult::ok(labels),
            Err(e) => {
                error!("Error setting tray labels: {:#}", e);
                TrayLabelsResult::failed(e.to_string())
            }
        }
    }

    /// Re-applies label overrides from a reloaded config. Returns `None` when
    /// the config carries no effective override.
    pub fn apply_label_overrides(
        &self,
        overrides: Option<&TrayLabelsUpdate>,
        tray: &dyn TrayView,
    ) -> Option<TrayLabelsResult> {
        let Some(update) = overrides.filter(|update| !update.is_empty()) else {
            debug!("Config carries no tray label overrides");
            return None;
        };
        let result = self.set_tray_labels(update, tray);
        if !result.success {
            warn!(
                "Could not apply tray labels from config: {}",
                result.error.as_deref().unwrap_or_default()
            );
        }
        Some(result)
    }

    pub fn tray_labels(&self) -> TrayLabelsResult {
        TrayLabelsResult::ok(self.labels.get())
    }

    pub fn reset_tray_labels(&self, tray: &dyn TrayView) -> TrayLabelsResult {
        match self.labels.reset(|labels| tray.apply_labels(labels)) {
            Ok(labels) => TrayLabelsResult::ok(labels),
            Err(e) => {
                error!("Error resetting tray labels: {:#}", e);
                TrayLabelsResult::failed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use anyhow::{Result, anyhow};

    use super::*;

    #[derive(Default)]
    struct FakeLauncher {
        enabled: Cell<bool>,
        fail_writes: bool,
        fail_reads: bool,
        writes: Rc<Cell<usize>>,
    }

    impl Launcher for FakeLauncher {
        fn enable(&self) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            if self.fail_writes {
                return Err(anyhow!("registration denied"));
            }
            self.enabled.set(true);
            Ok(())
        }

        fn disable(&self) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            if self.fail_writes {
                return Err(anyhow!("registration denied"));
            }
            self.enabled.set(false);
            Ok(())
        }

        fn is_enabled(&self) -> Result<bool> {
            if self.fail_reads {
                return Err(anyhow!("query failed"));
            }
            Ok(self.enabled.get())
        }
    }

    #[derive(Default)]
    struct RecordingTray {
        applied: RefCell<Vec<TrayLabels>>,
        broken: bool,
    }

    impl TrayView for RecordingTray {
        fn apply_labels(&self, labels: &TrayLabels) -> Result<()> {
            if self.broken {
                return Err(anyhow!("tray menu rejected"));
            }
            self.applied.borrow_mut().push(labels.clone());
            Ok(())
        }
    }

    fn host_with(launcher: FakeLauncher) -> Host {
        Host::new(Some(Box::new(launcher)), TrayLabels::default())
    }

    #[test]
    fn missing_launcher_is_reported_not_raised() {
        let host = Host::new(None, TrayLabels::default());
        assert_eq!(
            host.set_auto_launch(true),
            OperationResult::failed("Auto-launcher not available")
        );
        assert_eq!(host.auto_launch_status(), AutoLaunchStatus::unavailable());
    }

    #[test]
    fn toggling_auto_launch_round_trips_through_launcher() {
        let host = host_with(FakeLauncher::default());
        assert_eq!(host.set_auto_launch(true), OperationResult::ok());
        assert_eq!(
            host.auto_launch_status(),
            AutoLaunchStatus {
                available: true,
                enabled: true
            }
        );
        assert_eq!(host.set_auto_launch(false), OperationResult::ok());
        assert!(!host.auto_launch_status().enabled);
    }

    #[test]
    fn launcher_failure_becomes_error_field() {
        let host = host_with(FakeLauncher {
            fail_writes: true,
            ..Default::default()
        });
        let result = host.set_auto_launch(true);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("registration denied"));
    }

    #[test]
    fn status_query_failure_keeps_capability_available() {
        let host = host_with(FakeLauncher {
            fail_reads: true,
            ..Default::default()
        });
        assert_eq!(
            host.auto_launch_status(),
            AutoLaunchStatus {
                available: true,
                enabled: false
            }
        );
    }

    #[test]
    fn status_query_does_not_write() {
        let writes = Rc::new(Cell::new(0));
        let launcher = FakeLauncher {
            writes: writes.clone(),
            ..Default::default()
        };
        launcher.enabled.set(true);
        let host = host_with(launcher);
        for _ in 0..3 {
            assert!(host.auto_launch_status().enabled);
        }
        assert_eq!(writes.get(), 0);
    }

    #[test]
    fn set_tray_labels_merges_and_rebuilds_menu() {
        let host = Host::new(None, TrayLabels::default());
        let tray = RecordingTray::default();
        let update = TrayLabelsUpdate {
            show: Some("Go".into()),
            ..Default::default()
        };
        let result = host.set_tray_labels(&update, &tray);
        let expected = TrayLabels {
            show: "Go".into(),
            quit: "Quit".into(),
            tooltip: "aman".into(),
        };
        assert_eq!(result, TrayLabelsResult::ok(expected.clone()));
        assert_eq!(tray.applied.borrow().as_slice(), &[expected.clone()]);
        assert_eq!(host.tray_labels(), TrayLabelsResult::ok(expected));
    }

    #[test]
    fn failed_rebuild_leaves_labels_untouched() {
        let host = Host::new(None, TrayLabels::default());
        let tray = RecordingTray {
            broken: true,
            ..Default::default()
        };
        let update = TrayLabelsUpdate {
            quit: Some("Leave".into()),
            ..Default::default()
        };
        let result = host.set_tray_labels(&update, &tray);
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("tray menu rejected"));
        assert_eq!(host.labels(), TrayLabels::default());
    }

    #[test]
    fn reset_restores_defaults_and_rebuilds() {
        let host = Host::new(
            None,
            TrayLabels {
                show: "x".into(),
                quit: "y".into(),
                tooltip: "z".into(),
            },
        );
        let tray = RecordingTray::default();
        let result = host.handle(Request::ResetTrayLabels, &tray);
        assert_eq!(
            result,
            Response::TrayLabels(TrayLabelsResult::ok(TrayLabels::default()))
        );
        assert_eq!(tray.applied.borrow().len(), 1);
    }

    #[test]
    fn config_overrides_merge_into_current_labels() {
        let host = Host::new(None, TrayLabels::default());
        let tray = RecordingTray::default();
        let overrides = TrayLabelsUpdate {
            quit: Some("Exit".into()),
            ..Default::default()
        };
        let result = host.apply_label_overrides(Some(&overrides), &tray).unwrap();
        assert!(result.success);
        assert_eq!(host.labels().quit, "Exit");
        assert_eq!(host.labels().show, "Show App");
        assert_eq!(tray.applied.borrow().len(), 1);
    }

    #[test]
    fn empty_config_overrides_are_skipped() {
        let host = Host::new(None, TrayLabels::default());
        let tray = RecordingTray::default();
        let blank = TrayLabelsUpdate {
            show: Some(String::new()),
            ..Default::default()
        };
        assert!(host.apply_label_overrides(None, &tray).is_none());
        assert!(host.apply_label_overrides(Some(&blank), &tray).is_none());
        assert!(tray.applied.borrow().is_empty());
    }

    #[test]
    fn failed_override_rebuild_keeps_labels() {
        let host = Host::new(None, TrayLabels::default());
        let tray = RecordingTray {
            broken: true,
            ..Default::default()
        };
        let overrides = TrayLabelsUpdate {
            tooltip: Some("busy".into()),
            ..Default::default()
        };
        let result = host.apply_label_overrides(Some(&overrides), &tray).unwrap();
        assert!(!result.success);
        assert_eq!(host.labels(), TrayLabels::default());
    }

    #[test]
    fn handle_dispatches_every_request() {
        let host = host_with(FakeLauncher::default());
        let tray = RecordingTray::default();
        assert_eq!(
            host.handle(Request::SetAutoLaunch(true), &tray),
            Response::AutoLaunch(OperationResult::ok())
        );
        assert_eq!(
            host.handle(Request::GetAutoLaunchStatus, &tray),
            Response::AutoLaunchStatus(AutoLaunchStatus {
                available: true,
                enabled: true
            })
        );
        assert_eq!(
            host.handle(Request::GetTrayLabels, &tray),
            Response::TrayLabels(TrayLabelsResult::ok(TrayLabels::default()))
        );
        let response = host.handle(
            Request::SetTrayLabels(TrayLabelsUpdate {
                tooltip: Some("chat".into()),
                ..Default::default()
            }),
            &tray,
        );
        assert!(matches!(
            response,
            Response::TrayLabels(TrayLabelsResult { success: true, labels: Some(ref l), .. })
                if l.tooltip == "chat"
        ));
    }
}
