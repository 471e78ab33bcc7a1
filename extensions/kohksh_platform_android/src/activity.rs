//! Native activity entry point
//!
//! Runs the loading shell on the activity's main loop: the looper thread is
//! the UI thread, and the launch worker wakes it whenever it posts a label.

use std::sync::Arc;
use std::time::Duration;

use android_activity::{AndroidApp, MainEvent, PollEvent, WindowManagerFlags};
use kohksh_engine::{EngineSettings, KohkshRuntime};
use kohksh_platform::{Shell, ShellConfig, TextView, UiThread, WindowConfig};

use crate::bridge::GlobalBridge;
use crate::logging::init_logging;

/// Upper bound on one poll while idle
const POLL_TIMEOUT: Duration = Duration::from_millis(16);

fn apply_window_flags(app: &AndroidApp, window: &WindowConfig) {
    if window.fullscreen {
        app.set_window_flags(WindowManagerFlags::FULLSCREEN, WindowManagerFlags::empty());
    } else {
        app.set_window_flags(WindowManagerFlags::empty(), WindowManagerFlags::FULLSCREEN);
    }
    tracing::debug!(
        fullscreen = window.fullscreen,
        show_title = window.show_title,
        "window flags"
    );
}

#[no_mangle]
pub fn android_main(app: AndroidApp) {
    init_logging();
    tracing::info!("android_main starting");

    let waker = app.create_waker();
    let mut ui = UiThread::new(TextView::default()).with_waker(move || waker.wake());

    let flags_app = app.clone();
    ui.on_window_changed(move |window| apply_window_flags(&flags_app, window));
    ui.on_text_changed(|view| tracing::info!(text = %view.text(), "label"));

    let config = ShellConfig::default();
    let runtime = KohkshRuntime::new(EngineSettings::default(), config.engine_mode);
    if let Err(e) = KohkshRuntime::install_global(runtime) {
        // Activity recreated within the same process
        tracing::warn!("keeping existing runtime: {}", e);
    }

    let mut shell = match Shell::new(config, Arc::new(GlobalBridge)) {
        Ok(shell) => shell,
        Err(e) => {
            tracing::error!("shell setup failed: {}", e);
            return;
        }
    };
    if let Err(e) = shell.on_create(&mut ui) {
        tracing::error!("on_create failed: {}", e);
        return;
    }

    let mut running = true;
    while running {
        app.poll_events(Some(POLL_TIMEOUT), |event| match event {
            PollEvent::Main(MainEvent::Destroy) => {
                tracing::info!("activity destroyed");
                shell.on_destroy();
                running = false;
            }
            PollEvent::Main(MainEvent::InitWindow { .. }) => {
                if let Some(window) = app.native_window() {
                    tracing::info!("native window {}x{}", window.width(), window.height());
                }
            }
            PollEvent::Wake => tracing::trace!("woken by launch worker"),
            _ => {}
        });
        ui.pump();
    }

    tracing::info!("android_main exiting");
}
