//! Tray menu labels and the single-writer store that owns them.

use std::sync::{Mutex, PoisonError};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SHOW_LABEL: &str = "Show App";
pub const DEFAULT_QUIT_LABEL: &str = "Quit";
pub const DEFAULT_TOOLTIP: &str = crate::model::APP_NAME;

/// Display strings for the tray context menu. Always fully populated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct TrayLabels {
    pub show: String,
    pub quit: String,
    pub tooltip: String,
}

impl Default for TrayLabels {
    fn default() -> Self {
        Self {
            show: DEFAULT_SHOW_LABEL.to_string(),
            quit: DEFAULT_QUIT_LABEL.to_string(),
            tooltip: DEFAULT_TOOLTIP.to_string(),
        }
    }
}

/// Partial label update. Missing or empty fields leave the current value alone.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct TrayLabelsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

impl TrayLabelsUpdate {
    pub fn is_empty(&self) -> bool {
        [&self.show, &self.quit, &self.tooltip]
            .iter()
            .all(|field| non_empty(field).is_none())
    }
}

impl TrayLabels {
    /// Returns a copy with every non-empty field of `update` laid over `self`.
    pub fn merged(&self, update: &TrayLabelsUpdate) -> TrayLabels {
        TrayLabels {
            show: pick(&update.show, &self.show),
            quit: pick(&update.quit, &self.quit),
            tooltip: pick(&update.tooltip, &self.tooltip),
        }
    }

    /// Builds a complete record from a partial one, filling gaps from the defaults.
    pub fn validated(update: &TrayLabelsUpdate) -> TrayLabels {
        TrayLabels::default().merged(update)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

fn pick(field: &Option<String>, current: &str) -> String {
    non_empty(field).unwrap_or(current).to_string()
}

/// Owns the live label record. Merge and menu rebuild happen under one lock;
/// the new record is committed only when the rebuild succeeds, for resets too.
#[derive(Debug, Default)]
pub struct LabelStore {
    current: Mutex<TrayLabels>,
}

impl LabelStore {
    pub fn new(initial: TrayLabels) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> TrayLabels {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn apply<F>(&self, update: &TrayLabelsUpdate, rebuild: F) -> Result<TrayLabels>
    where
        F: FnOnce(&TrayLabels) -> Result<()>,
    {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow!("tray label state is poisoned"))?;
        let merged = current.merged(update);
        rebuild(&merged)?;
        *current = merged.clone();
        Ok(merged)
    }

    pub fn reset<F>(&self, rebuild: F) -> Result<TrayLabels>
    where
        F: FnOnce(&TrayLabels) -> Result<()>,
    {
        let mut current = self
            .current
            .lock()
            .map_err(|_| anyhow!("tray label state is poisoned"))?;
        let defaults = TrayLabels::default();
        rebuild(&defaults)?;
        *current = defaults.clone();
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(show: Option<&str>, quit: Option<&str>, tooltip: Option<&str>) -> TrayLabelsUpdate {
        TrayLabelsUpdate {
            show: show.map(String::from),
            quit: quit.map(String::from),
            tooltip: tooltip.map(String::from),
        }
    }

    #[test]
    fn defaults_match_shipped_labels() {
        let labels = TrayLabels::default();
        assert_eq!(labels.show, "Show App");
        assert_eq!(labels.quit, "Quit");
        assert_eq!(labels.tooltip, "aman");
    }

    #[test]
    fn partial_update_keeps_omitted_fields() {
        let merged = TrayLabels::default().merged(&update(Some("Go"), None, None));
        assert_eq!(
            merged,
            TrayLabels {
                show: "Go".into(),
                quit: "Quit".into(),
                tooltip: "aman".into(),
            }
        );
    }

    #[test]
    fn empty_strings_never_blank_a_label() {
        let current = TrayLabels {
            show: "Open".into(),
            quit: "Exit".into(),
            tooltip: "custom".into(),
        };
        let merged = current.merged(&update(Some(""), Some(""), Some("")));
        assert_eq!(merged, current);
        assert!(update(Some(""), None, Some("")).is_empty());
    }

    #[test]
    fn validated_fills_from_defaults() {
        let labels = TrayLabels::validated(&update(None, Some("Leave"), None));
        assert_eq!(labels.show, DEFAULT_SHOW_LABEL);
        assert_eq!(labels.quit, "Leave");
        assert_eq!(labels.tooltip, DEFAULT_TOOLTIP);
    }

    #[test]
    fn store_commits_only_after_rebuild() {
        let store = LabelStore::default();
        let err = store
            .apply(&update(Some("Go"), None, None), |_| {
                Err(anyhow!("menu unavailable"))
            })
            .unwrap_err();
        assert!(err.to_string().contains("menu unavailable"));
        assert_eq!(store.get(), TrayLabels::default());

        let mut seen = None;
        let merged = store
            .apply(&update(Some("Go"), None, Some("tip")), |labels| {
                seen = Some(labels.clone());
                Ok(())
            })
            .unwrap();
        assert_eq!(seen.as_ref(), Some(&merged));
        assert_eq!(store.get().show, "Go");
        assert_eq!(store.get().tooltip, "tip");
    }

    #[test]
    fn reset_restores_defaults_from_any_state() {
        let store = LabelStore::new(TrayLabels {
            show: "a".into(),
            quit: "b".into(),
            tooltip: "c".into(),
        });
        let reset = store.reset(|_| Ok(())).unwrap();
        assert_eq!(reset, TrayLabels::default());
        assert_eq!(store.get(), TrayLabels::default());
    }

    #[test]
    fn reset_with_failed_rebuild_keeps_previous_labels() {
        let custom = TrayLabels {
            show: "Open".into(),
            quit: "Exit".into(),
            tooltip: "custom".into(),
        };
        let store = LabelStore::new(custom.clone());
        assert!(store.reset(|_| Err(anyhow!("menu unavailable"))).is_err());
        assert_eq!(store.get(), custom);
    }

    #[test]
    fn update_deserializes_from_partial_json() {
        let parsed: TrayLabelsUpdate = serde_json::from_str(r#"{"quit":"Bye"}"#).unwrap();
        assert_eq!(parsed, update(None, Some("Bye"), None));
    }
}
