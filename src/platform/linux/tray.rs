//! Linux tray hosted on a dedicated GTK thread.
//!
//! tray-icon creates its AppIndicator and menus through GTK, which has to be
//! initialised and pumped on the thread that owns them. winit never pumps GTK,
//! so the tray lives on its own thread running `gtk::main`. Menu and icon
//! events still arrive through tray-icon's global receivers.

use std::cell::RefCell;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::bounded;
use gtk::glib;
use log::{debug, error};

use crate::labels::TrayLabels;
use crate::ui::icon::load_tray_icon;
use crate::ui::tray::{Tray, TrayView};

const LABEL_UPDATE_TIMEOUT: Duration = Duration::from_secs(2);

thread_local! {
    static TRAY: RefCell<Option<Tray>> = const { RefCell::new(None) };
}

/// Handle to the tray owned by the GTK thread.
pub struct GtkTray {
    thread: Option<thread::JoinHandle<()>>,
}

impl GtkTray {
    /// Starts the GTK thread and waits until the tray is built there.
    pub fn spawn(icon_path: Option<PathBuf>, labels: TrayLabels) -> Result<Self> {
        let (ready_tx, ready_rx) = bounded::<Result<()>>(1);
        let thread = thread::Builder::new()
            .name("gtk-tray".into())
            .spawn(move || {
                let built = gtk::init()
                    .map_err(|e| anyhow!("failed to initialise GTK: {e}"))
                    .and_then(|()| {
                        let icon = load_tray_icon(icon_path.as_deref())
                            .context("failed to create tray icon image")?;
                        Tray::new(icon, &labels)
                    });
                match built {
                    Ok(tray) => {
                        TRAY.with(|slot| *slot.borrow_mut() = Some(tray));
                        let _ = ready_tx.send(Ok(()));
                        gtk::main();
                        TRAY.with(|slot| slot.borrow_mut().take());
                        debug!("GTK tray thread finished");
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                    }
                }
            })
            .context("failed to spawn GTK tray thread")?;

        ready_rx
            .recv()
            .context("GTK tray thread exited during startup")??;
        Ok(Self {
            thread: Some(thread),
        })
    }
}

impl TrayView for GtkTray {
    fn apply_labels(&self, labels: &TrayLabels) -> Result<()> {
        let (reply_tx, reply_rx) = bounded(1);
        let labels = labels.clone();
        glib::idle_add_once(move || {
            let result = TRAY.with(|slot| match slot.borrow().as_ref() {
                Some(tray) => tray.apply_labels(&labels),
                None => Err(anyhow!("tray is not running")),
            });
            let _ = reply_tx.send(result);
        });
        reply_rx
            .recv_timeout(LABEL_UPDATE_TIMEOUT)
            .context("GTK tray thread did not apply the labels")?
    }
}

impl Drop for GtkTray {
    fn drop(&mut self) {
        glib::idle_add_once(gtk::main_quit);
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            error!("GTK tray thread panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_update_without_a_running_gtk_loop_fails() {
        let tray = GtkTray { thread: None };
        let err = tray.apply_labels(&TrayLabels::default()).unwrap_err();
        assert!(err.to_string().contains("did not apply"));
    }
}
