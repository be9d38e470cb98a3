use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use notify::{Event as NotifyEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tray_icon::TrayIconEvent;
use tray_icon::menu::MenuEvent;
use winit::event::{Event, StartCause, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopProxy};

use crate::bridge::Bridge;
use crate::config::{
    Config, ContentConfig, get_config_path, is_dev_mode, load_and_validate_config,
    load_or_create_config,
};
use crate::host::Host;
use crate::labels::TrayLabels;
use crate::launch::{Launcher, create_launcher};
use crate::model::{APP_NAME, MenuAction, UserEvent};
use crate::ui::menu::parse_menu_action;
use crate::ui::process::UiProcess;
use crate::ui::tray::{SystemTray, create_tray};
use crate::ui::window::{CloseAction, MainWindow};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const CONFIG_DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

pub fn run() -> Result<()> {
    let first_run = !get_config_path().exists();
    let config = load_or_create_config().context("failed to load configuration")?;
    let dev_mode = is_dev_mode();
    info!(
        "Starting {} (dev mode: {}, first run: {})",
        APP_NAME, dev_mode, first_run
    );

    let launcher = create_launcher(APP_NAME, dev_mode);
    if first_run && config.auto_launch.enable_on_first_run {
        enable_on_first_run(launcher.as_deref());
    }

    let initial_labels = config
        .tray
        .labels
        .as_ref()
        .map(TrayLabels::validated)
        .unwrap_or_default();
    let host = Host::new(launcher, initial_labels);

    let event_loop = EventLoop::<UserEvent>::with_user_event()
        .build()
        .context("failed to create event loop")?;
    let proxy = event_loop.create_proxy();
    let (bridge, invocations) = Bridge::channel();

    let _config_watcher = spawn_config_watcher(proxy.clone());
    let ui_process = spawn_ui_process(&config.content, dev_mode, bridge, proxy.clone());
    let menu_receiver = MenuEvent::receiver().clone();
    let tray_receiver = TrayIconEvent::receiver().clone();

    let tray = create_tray(config.tray.icon_path.as_deref(), &host.labels())?;
    let mut window = MainWindow::new(config.window.clone());

    #[allow(deprecated)]
    let run_result = event_loop.run(move |event, event_loop| match event {
        Event::NewEvents(StartCause::Init) => {
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + EVENT_POLL_INTERVAL));
        }
        Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
            while let Ok(event) = menu_receiver.try_recv() {
                if let Some(action) = parse_menu_action(event.id()) {
                    let _ = proxy.send_event(UserEvent::MenuAction(action));
                }
            }
            while let Ok(event) = tray_receiver.try_recv() {
                if matches!(event, TrayIconEvent::DoubleClick { .. }) {
                    let _ = proxy.send_event(UserEvent::TrayDoubleClick);
                }
            }
            // Requests are served one at a time on this thread
            while let Ok(invocation) = invocations.try_recv() {
                debug!("Bridge request: {}", invocation.request.channel());
                let response = host.handle(invocation.request, &tray);
                if invocation.reply.send(response).is_err() {
                    warn!("Bridge caller went away before the reply was sent");
                }
            }
            event_loop.set_control_flow(ControlFlow::WaitUntil(Instant::now() + EVENT_POLL_INTERVAL));
        }
        Event::Resumed => {
            if let Err(e) = window.activate(event_loop) {
                error!("{:#}", e);
                event_loop.exit();
            }
        }
        Event::WindowEvent { window_id, event } if window.is(window_id) => match event {
            WindowEvent::CloseRequested => match window.close_requested() {
                CloseAction::Hide => debug!("Main window hidden to tray"),
                CloseAction::Exit => event_loop.exit(),
            },
            WindowEvent::Destroyed => window.destroyed(),
            _ => {}
        },
        Event::UserEvent(user_event) => match user_event {
            UserEvent::MenuAction(MenuAction::Show) | UserEvent::TrayDoubleClick => {
                window.show();
            }
            UserEvent::MenuAction(MenuAction::Quit) => {
                window.begin_quit();
                event_loop.exit();
            }
            UserEvent::ConfigReloaded(new_config) => {
                apply_reloaded_config(&host, &tray, &mut window, new_config);
            }
            UserEvent::ConfigReloadFailed(message) => {
                warn!("{}", message);
            }
            UserEvent::UiProcessExited(message) => {
                info!("{}", message);
            }
        },
        Event::LoopExiting => {
            info!("Shutting down");
            if let Some(process) = &ui_process {
                process.shutdown();
            }
        }
        _ => {}
    });

    run_result.context("event loop terminated with error")?;
    Ok(())
}

/// First-run registration is opt-in through `auto_launch.enable_on_first_run`.
fn enable_on_first_run(launcher: Option<&dyn Launcher>) {
    let Some(launcher) = launcher else {
        debug!("Skipping first-run auto-launch: capability unavailable");
        return;
    };
    match launcher.enable() {
        Ok(()) => info!("Enabled auto-launch on first run"),
        Err(e) => warn!("Failed to enable auto-launch by default: {:#}", e),
    }
}

fn apply_reloaded_config(host: &Host, tray: &SystemTray, window: &mut MainWindow, config: Config) {
    host.apply_label_overrides(config.tray.labels.as_ref(), tray);
    window.apply_config(config.window);
    info!("Configuration reloaded");
}

fn spawn_config_watcher(proxy: EventLoopProxy<UserEvent>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let config_path = get_config_path();
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher: RecommendedWatcher = match Watcher::new(
            move |res: Result<NotifyEvent, notify::Error>| {
                let _ = tx.send(res);
            },
            notify::Config::default(),
        ) {
            Ok(w) => w,
            Err(e) => {
                error!("Failed to create config watcher: {}", e);
                return;
            }
        };

        if let Err(e) = watcher.watch(&config_path, RecursiveMode::NonRecursive) {
            error!("Failed to watch config file: {}", e);
            return;
        }

        debug!("Config watcher started for {:?}", config_path);

        let mut last_reload = Instant::now() - CONFIG_DEBOUNCE_DURATION;

        for result in rx {
            match result {
                Ok(event) => {
                    if !matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        continue;
                    }
                    // Editors may write in several operations
                    if last_reload.elapsed() < CONFIG_DEBOUNCE_DURATION {
                        continue;
                    }
                    last_reload = Instant::now();

                    debug!("Config file changed, attempting reload");
                    let event = match load_and_validate_config() {
                        Ok(new_config) => UserEvent::ConfigReloaded(new_config),
                        Err(e) => UserEvent::ConfigReloadFailed(format!(
                            "Config reload failed: {:#}",
                            e
                        )),
                    };
                    if proxy.send_event(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Config watch error: {}", e);
                }
            }
        }
    })
}

/// Starts the configured UI process and serves the bridge over its stdio.
fn spawn_ui_process(
    content: &ContentConfig,
    dev_mode: bool,
    bridge: Bridge,
    proxy: EventLoopProxy<UserEvent>,
) -> Option<UiProcess> {
    let Some(command) = content.ui_command.as_deref() else {
        debug!("No UI process configured; bridge idle");
        return None;
    };
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let start_url = content.start_url(dev_mode, &exe_dir);

    let on_exit = move |message: String| {
        let _ = proxy.send_event(UserEvent::UiProcessExited(message));
    };
    match UiProcess::spawn(command, &start_url, bridge, on_exit) {
        Ok(process) => Some(process),
        Err(e) => {
            error!("UI process failed: {:#}", e);
            None
        }
    }
}
