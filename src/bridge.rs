//! The only communication path between the UI side and the host.
//!
//! The UI side calls a fixed set of named channels. Each call is forwarded to
//! the host's event loop and the caller blocks until the host replies. Web
//! content speaks the same contract as JSON lines:
//! `{"channel": "set-tray-labels", "payload": {"show": "Open"}}`.

use std::io::{BufRead, Write};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::{Receiver, Sender};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::labels::{TrayLabels, TrayLabelsUpdate};
use crate::model::{
    APP_DISPLAY_NAME, APP_VERSION, AutoLaunchStatus, OperationResult, Response, TrayLabelsResult,
};

pub const CHANNEL_SET_AUTO_LAUNCH: &str = "set-auto-launch";
pub const CHANNEL_GET_AUTO_LAUNCH_STATUS: &str = "get-auto-launch-status";
pub const CHANNEL_SET_TRAY_LABELS: &str = "set-tray-labels";
pub const CHANNEL_GET_TRAY_LABELS: &str = "get-tray-labels";
pub const CHANNEL_RESET_TRAY_LABELS: &str = "reset-tray-labels";
pub const CHANNEL_APP_NAME: &str = "app-name";
pub const CHANNEL_APP_VERSION: &str = "app-version";

/// Channels web content may call. Anything else is rejected before reaching the host.
pub const EXPOSED_CHANNELS: &[&str] = &[
    CHANNEL_SET_AUTO_LAUNCH,
    CHANNEL_GET_AUTO_LAUNCH_STATUS,
    CHANNEL_SET_TRAY_LABELS,
    CHANNEL_GET_TRAY_LABELS,
    CHANNEL_RESET_TRAY_LABELS,
    CHANNEL_APP_NAME,
    CHANNEL_APP_VERSION,
];

/// Operations served by the host process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    SetAutoLaunch(bool),
    GetAutoLaunchStatus,
    SetTrayLabels(TrayLabelsUpdate),
    GetTrayLabels,
    ResetTrayLabels,
}

impl Request {
    pub fn channel(&self) -> &'static str {
        match self {
            Request::SetAutoLaunch(_) => CHANNEL_SET_AUTO_LAUNCH,
            Request::GetAutoLaunchStatus => CHANNEL_GET_AUTO_LAUNCH_STATUS,
            Request::SetTrayLabels(_) => CHANNEL_SET_TRAY_LABELS,
            Request::GetTrayLabels => CHANNEL_GET_TRAY_LABELS,
            Request::ResetTrayLabels => CHANNEL_RESET_TRAY_LABELS,
        }
    }

    /// Decodes a host operation from a channel name and its JSON payload.
    pub fn from_channel(channel: &str, payload: Option<Value>) -> Result<Self> {
        let request = match channel {
            CHANNEL_SET_AUTO_LAUNCH => {
                let enabled = payload.ok_or_else(|| anyhow!("{channel} requires a boolean payload"))?;
                Request::SetAutoLaunch(
                    serde_json::from_value(enabled)
                        .with_context(|| format!("invalid payload for {channel}"))?,
                )
            }
            CHANNEL_GET_AUTO_LAUNCH_STATUS => Request::GetAutoLaunchStatus,
            CHANNEL_SET_TRAY_LABELS => {
                let update = match payload {
                    Some(Value::Null) | None => TrayLabelsUpdate::default(),
                    Some(value) => serde_json::from_value(value)
                        .with_context(|| format!("invalid payload for {channel}"))?,
                };
                Request::SetTrayLabels(update)
            }
            CHANNEL_GET_TRAY_LABELS => Request::GetTrayLabels,
            CHANNEL_RESET_TRAY_LABELS => Request::ResetTrayLabels,
            other => bail!("channel '{other}' is not exposed to the UI"),
        };
        Ok(request)
    }
}

/// A request in flight, paired with the slot the host answers into.
#[derive(Debug)]
pub struct Invocation {
    pub request: Request,
    pub reply: Sender<Response>,
}

/// Host operations as seen from the UI side.
pub trait HostApi {
    fn set_auto_launch(&self, enabled: bool) -> Result<OperationResult>;
    fn get_auto_launch_status(&self) -> Result<AutoLaunchStatus>;
    fn set_tray_labels(&self, update: TrayLabelsUpdate) -> Result<TrayLabelsResult>;
    fn get_tray_labels(&self) -> Result<TrayLabelsResult>;
    fn reset_tray_labels(&self) -> Result<TrayLabelsResult>;
}

/// UI-side handle that forwards calls to the host.
#[derive(Clone, Debug)]
pub struct Bridge {
    tx: Sender<Invocation>,
}

#[derive(Deserialize)]
struct Envelope {
    channel: String,
    #[serde(default)]
    payload: Option<Value>,
}

impl Bridge {
    /// Creates a bridge and the receiving end the host drains.
    pub fn channel() -> (Bridge, Receiver<Invocation>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (Bridge { tx }, rx)
    }

    pub fn app_name(&self) -> &'static str {
        APP_DISPLAY_NAME
    }

    pub fn app_version(&self) -> &'static str {
        APP_VERSION
    }

    fn invoke(&self, request: Request) -> Result<Response> {
        let channel = request.channel();
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.tx
            .send(Invocation {
                request,
                reply: reply_tx,
            })
            .map_err(|_| anyhow!("host process is not running"))?;
        reply_rx
            .recv()
            .with_context(|| format!("host dropped {channel} without replying"))
    }

    /// Current labels, or `None` when the host reports a failure.
    pub fn current_tray_labels(&self) -> Result<Option<TrayLabels>> {
        let result = self.get_tray_labels()?;
        Ok(if result.success { result.labels } else { None })
    }

    /// Handles one JSON envelope from web content and returns the JSON reply.
    pub fn invoke_json(&self, raw: &str) -> String {
        let reply = match self.dispatch_json(raw) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Rejected bridge call: {:#}", e);
                json!({ "success": false, "error": format!("{:#}", e) })
            }
        };
        reply.to_string()
    }

    fn dispatch_json(&self, raw: &str) -> Result<Value> {
        let envelope: Envelope =
            serde_json::from_str(raw).context("malformed bridge message")?;
        if !EXPOSED_CHANNELS.contains(&envelope.channel.as_str()) {
            bail!("channel '{}' is not exposed to the UI", envelope.channel);
        }
        match envelope.channel.as_str() {
            CHANNEL_APP_NAME => Ok(json!({ "success": true, "value": self.app_name() })),
            CHANNEL_APP_VERSION => Ok(json!({ "success": true, "value": self.app_version() })),
            channel => {
                let request = Request::from_channel(channel, envelope.payload)?;
                let response = self.invoke(request)?;
                serde_json::to_value(response).context("failed to encode host response")
            }
        }
    }
}

fn unexpected(channel: &str, response: Response) -> anyhow::Error {
    anyhow!("host answered {channel} with an unexpected response: {response:?}")
}

impl HostApi for Bridge {
    fn set_auto_launch(&self, enabled: bool) -> Result<OperationResult> {
        match self.invoke(Request::SetAutoLaunch(enabled))? {
            Response::AutoLaunch(result) => Ok(result),
            other => Err(unexpected(CHANNEL_SET_AUTO_LAUNCH, other)),
        }
    }

    fn get_auto_launch_status(&self) -> Result<AutoLaunchStatus> {
        match self.invoke(Request::GetAutoLaunchStatus)? {
            Response::AutoLaunchStatus(status) => Ok(status),
            other => Err(unexpected(CHANNEL_GET_AUTO_LAUNCH_STATUS, other)),
        }
    }

    fn set_tray_labels(&self, update: TrayLabelsUpdate) -> Result<TrayLabelsResult> {
        match self.invoke(Request::SetTrayLabels(update))? {
            Response::TrayLabels(result) => Ok(result),
            other => Err(unexpected(CHANNEL_SET_TRAY_LABELS, other)),
        }
    }

    fn get_tray_labels(&self) -> Result<TrayLabelsResult> {
        match self.invoke(Request::GetTrayLabels)? {
            Response::TrayLabels(result) => Ok(result),
            other => Err(unexpected(CHANNEL_GET_TRAY_LABELS, other)),
        }
    }

    fn reset_tray_labels(&self) -> Result<TrayLabelsResult> {
        match self.invoke(Request::ResetTrayLabels)? {
            Response::TrayLabels(result) => Ok(result),
            other => Err(unexpected(CHANNEL_RESET_TRAY_LABELS, other)),
        }
    }
}

/// Serves JSON-line bridge calls until `reader` reaches end of input.
///
/// One reply line is written per non-empty request line, in order.
pub fn serve_lines<R: BufRead, W: Write>(bridge: &Bridge, reader: R, mut writer: W) -> Result<()> {
    for line in reader.lines() {
        let line = line.context("failed to read from UI process")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = bridge.invoke_json(line);
        writeln!(writer, "{}", reply).context("failed to write to UI process")?;
        writer.flush().context("failed to flush reply to UI process")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::thread;

    use super::*;

    /// Answers every invocation on a background thread with a canned host.
    fn spawn_host(rx: Receiver<Invocation>) -> thread::JoinHandle<Vec<Request>> {
        thread::spawn(move || {
            let mut seen = Vec::new();
            let mut labels = TrayLabels::default();
            for invocation in rx.iter() {
                let response = match &invocation.request {
                    Request::SetAutoLaunch(_) => Response::AutoLaunch(OperationResult::ok()),
                    Request::GetAutoLaunchStatus => Response::AutoLaunchStatus(AutoLaunchStatus {
                        available: true,
                        enabled: false,
                    }),
                    Request::SetTrayLabels(update) => {
                        labels = labels.merged(update);
                        Response::TrayLabels(TrayLabelsResult::ok(labels.clone()))
                    }
                    Request::GetTrayLabels => {
                        Response::TrayLabels(TrayLabelsResult::ok(labels.clone()))
                    }
                    Request::ResetTrayLabels => {
                        labels = TrayLabels::default();
                        Response::TrayLabels(TrayLabelsResult::ok(labels.clone()))
                    }
                };
                seen.push(invocation.request);
                let _ = invocation.reply.send(response);
            }
            seen
        })
    }

    #[test]
    fn typed_calls_reach_the_host() {
        let (bridge, rx) = Bridge::channel();
        let host = spawn_host(rx);

        assert!(bridge.set_auto_launch(true).unwrap().success);
        assert!(bridge.get_auto_launch_status().unwrap().available);
        let result = bridge
            .set_tray_labels(TrayLabelsUpdate {
                show: Some("Open".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(result.labels.unwrap().show, "Open");
        assert_eq!(bridge.current_tray_labels().unwrap().unwrap().show, "Open");
        assert_eq!(
            bridge.reset_tray_labels().unwrap().labels,
            Some(TrayLabels::default())
        );

        drop(bridge);
        let seen = host.join().unwrap();
        assert_eq!(seen.len(), 5);
        assert_eq!(seen[0], Request::SetAutoLaunch(true));
    }

    #[test]
    fn calls_fail_once_host_is_gone() {
        let (bridge, rx) = Bridge::channel();
        drop(rx);
        let err = bridge.get_auto_launch_status().unwrap_err();
        assert!(err.to_string().contains("not running"));
    }

    #[test]
    fn unknown_channels_never_reach_the_host() {
        let (bridge, rx) = Bridge::channel();
        let reply: Value =
            serde_json::from_str(&bridge.invoke_json(r#"{"channel":"open-devtools"}"#)).unwrap();
        assert_eq!(reply["success"], false);
        assert!(reply["error"].as_str().unwrap().contains("not exposed"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        let (bridge, rx) = Bridge::channel();
        for raw in [
            "not json",
            r#"{"channel":"set-auto-launch"}"#,
            r#"{"channel":"set-auto-launch","payload":"yes"}"#,
            r#"{"channel":"set-tray-labels","payload":{"show":5}}"#,
        ] {
            let reply: Value = serde_json::from_str(&bridge.invoke_json(raw)).unwrap();
            assert_eq!(reply["success"], false, "{raw}");
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn identity_is_answered_locally() {
        let (bridge, rx) = Bridge::channel();
        let name: Value =
            serde_json::from_str(&bridge.invoke_json(r#"{"channel":"app-name"}"#)).unwrap();
        let version: Value =
            serde_json::from_str(&bridge.invoke_json(r#"{"channel":"app-version"}"#)).unwrap();
        assert_eq!(name["value"], "Conversational AI Voice App");
        assert_eq!(version["value"], "0.0.1");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn serve_lines_answers_each_request_in_order() {
        let (bridge, rx) = Bridge::channel();
        let host = spawn_host(rx);
        let input = concat!(
            r#"{"channel":"set-tray-labels","payload":{"show":"Go"}}"#,
            "\n\n",
            r#"{"channel":"get-auto-launch-status"}"#,
            "\n",
            r#"{"channel":"nope"}"#,
            "\n",
        );
        let mut output = Vec::new();
        serve_lines(&bridge, Cursor::new(input), &mut output).unwrap();
        drop(bridge);
        host.join().unwrap();

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(replies.len(), 3);
        assert_eq!(
            replies[0],
            json!({"success": true, "labels": {"show": "Go", "quit": "Quit", "tooltip": "aman"}})
        );
        assert_eq!(replies[1], json!({"available": true, "enabled": false}));
        assert_eq!(replies[2]["success"], false);
    }

    #[test]
    fn empty_label_payload_is_a_no_op_update() {
        assert_eq!(
            Request::from_channel(CHANNEL_SET_TRAY_LABELS, None).unwrap(),
            Request::SetTrayLabels(TrayLabelsUpdate::default())
        );
    }
}
