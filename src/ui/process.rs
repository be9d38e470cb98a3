//! Optional UI child process speaking the bridge over stdin/stdout.

use std::io::BufReader;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};

use crate::bridge::{Bridge, serve_lines};

type ChildSlot = Arc<Mutex<Option<Child>>>;

/// A running UI process. The host keeps this handle so the child can be
/// stopped and reaped on exit.
pub struct UiProcess {
    child: ChildSlot,
}

impl UiProcess {
    /// Starts `command` and serves bridge calls from its stdout on a thread.
    ///
    /// `on_exit` receives a one-line description once the child is gone,
    /// whichever side ended it.
    pub fn spawn<F>(command: &[String], start_url: &str, bridge: Bridge, on_exit: F) -> Result<Self>
    where
        F: FnOnce(String) + Send + 'static,
    {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| anyhow!("empty UI command"))?;
        info!("Launching UI process {} with {}", program, start_url);

        let mut child = Command::new(program)
            .args(args)
            .env("AMAN_START_URL", start_url)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start {}", program))?;

        let io = child
            .stdin
            .take()
            .zip(child.stdout.take())
            .ok_or_else(|| anyhow!("UI process stdio unavailable"));
        let (stdin, stdout) = match io {
            Ok(io) => io,
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(e);
            }
        };

        let slot: ChildSlot = Arc::new(Mutex::new(Some(child)));
        let served = Arc::clone(&slot);
        thread::spawn(move || {
            let outcome = serve_lines(&bridge, BufReader::new(stdout), stdin);
            let message = finish(&served, outcome);
            on_exit(message);
        });

        Ok(Self { child: slot })
    }

    pub fn is_running(&self) -> bool {
        self.child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Kills the child if it is still alive and waits for it.
    pub fn shutdown(&self) {
        let child = self
            .child
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(mut child) = child {
            debug!("Stopping UI process {}", child.id());
            kill_and_reap(&mut child);
        }
    }
}

impl Drop for UiProcess {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Reaps the child after serving ends. A serving error kills it first.
fn finish(slot: &ChildSlot, outcome: Result<()>) -> String {
    let child = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    let Some(mut child) = child else {
        return "UI process stopped by host".to_string();
    };
    match outcome {
        Ok(()) => match child.wait() {
            Ok(status) => format!("UI process exited with {}", status),
            Err(e) => format!("failed to wait for UI process: {}", e),
        },
        Err(e) => {
            warn!("UI process bridge failed: {:#}", e);
            kill_and_reap(&mut child);
            format!("UI process failed: {:#}", e)
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        debug!("UI process already gone: {}", e);
    }
    if let Err(e) = child.wait() {
        warn!("Failed to reap UI process: {}", e);
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use crossbeam_channel::bounded;

    use super::*;

    fn command(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|part| part.to_string()).collect()
    }

    #[test]
    fn shutdown_kills_and_reaps_a_running_child() {
        let (bridge, _invocations) = Bridge::channel();
        let (exit_tx, exit_rx) = bounded(1);
        let process = UiProcess::spawn(&command(&["sleep", "30"]), "about:blank", bridge, move |msg| {
            let _ = exit_tx.send(msg);
        })
        .unwrap();
        assert!(process.is_running());

        process.shutdown();
        assert!(!process.is_running());
        let message = exit_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(message, "UI process stopped by host");
    }

    #[test]
    fn child_exit_is_reported_and_reaped() {
        let (bridge, _invocations) = Bridge::channel();
        let (exit_tx, exit_rx) = bounded(1);
        let process = UiProcess::spawn(&command(&["true"]), "about:blank", bridge, move |msg| {
            let _ = exit_tx.send(msg);
        })
        .unwrap();

        let message = exit_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(message.starts_with("UI process exited"), "{message}");
        assert!(!process.is_running());
    }

    #[test]
    fn bridge_failure_still_reaps_the_child() {
        let (bridge, _invocations) = Bridge::channel();
        let (exit_tx, exit_rx) = bounded(1);
        // Invalid UTF-8 on stdout makes serving fail while the child lives on
        let process = UiProcess::spawn(
            &command(&["sh", "-c", "printf '\\377\\n'; exec sleep 30"]),
            "about:blank",
            bridge,
            move |msg| {
                let _ = exit_tx.send(msg);
            },
        )
        .unwrap();

        let message = exit_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(message.starts_with("UI process failed"), "{message}");
        assert!(!process.is_running());
    }

    #[test]
    fn empty_command_is_rejected() {
        let (bridge, _invocations) = Bridge::channel();
        assert!(UiProcess::spawn(&[], "about:blank", bridge, |_| {}).is_err());
    }
}
