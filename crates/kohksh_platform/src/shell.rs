//! The application shell
//!
//! Mirrors the activity lifecycle of the Android launcher:
//!
//! 1. `on_create` configures the window, asks the native library for its
//!    version on the UI thread, shows the loading label and schedules the
//!    delayed launch.
//! 2. The launch worker posts the "starting" label and hands off to
//!    `nativeInit` / `startKohksh`.
//! 3. `on_destroy` cancels whatever part of the launch has not happened yet.

use std::sync::Arc;

use kohksh_core::fsm::{EventId, StateId, StateMachine};

use crate::bridge::{call_guarded, NativeBridge, GET_VERSION};
use crate::config::ShellConfig;
use crate::error::{PlatformError, Result};
use crate::launch::{LaunchHandle, LaunchPlan};
use crate::ui::{Gravity, UiThread};

const CREATED: StateId = 0;
const RUNNING: StateId = 1;
const DESTROYED: StateId = 2;

const START: EventId = 1;
const DESTROY: EventId = 2;

/// Activity lifecycle as tracked by the shell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Created,
    Running,
    Destroyed,
}

/// Loading-screen shell that launches the native engine
pub struct Shell {
    config: ShellConfig,
    bridge: Arc<dyn NativeBridge>,
    lifecycle: StateMachine,
    launch: Option<LaunchHandle>,
}

impl Shell {
    pub fn new(config: ShellConfig, bridge: Arc<dyn NativeBridge>) -> Result<Self> {
        config.validate()?;
        let lifecycle = StateMachine::builder(CREATED)
            .name("shell")
            .on(CREATED, START, RUNNING)
            .on(CREATED, DESTROY, DESTROYED)
            .on(RUNNING, DESTROY, DESTROYED)
            .terminal(DESTROYED)
            .build();

        Ok(Self {
            config,
            bridge,
            lifecycle,
            launch: None,
        })
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle {
        match self.lifecycle.current_state() {
            CREATED => Lifecycle::Created,
            RUNNING => Lifecycle::Running,
            _ => Lifecycle::Destroyed,
        }
    }

    /// The scheduled launch, once `on_create` has run
    pub fn launch(&self) -> Option<&LaunchHandle> {
        self.launch.as_ref()
    }

    /// Show the loading screen and schedule the native launch.
    ///
    /// Runs on the UI thread. A failing `getVersion` is returned as-is and
    /// nothing is scheduled.
    pub fn on_create(&mut self, ui: &mut UiThread) -> Result<LaunchHandle> {
        if !self.lifecycle.can_send(START) {
            return Err(PlatformError::Lifecycle(format!(
                "on_create in state {:?}",
                self.lifecycle()
            )));
        }

        ui.apply_window(self.config.window());

        let version = call_guarded(GET_VERSION, || self.bridge.version())?;
        tracing::info!(%version, "native library version");

        let view = ui.view_mut();
        view.set_text_size(self.config.text_size);
        view.set_gravity(Gravity::Center);
        ui.set_text(self.config.loading_text(&version));

        let plan = LaunchPlan {
            delay: self.config.launch_delay(),
            starting_message: self.config.starting_message.clone(),
            mode: self.config.engine_mode,
        };
        let handle = LaunchHandle::spawn(plan, Arc::clone(&self.bridge), ui.handle())?;
        tracing::info!(delay_ms = self.config.launch_delay_ms, "launch scheduled");

        self.launch = Some(handle.clone());
        self.lifecycle.send(START);
        Ok(handle)
    }

    /// Tear down: cancel the pending launch (or stop a running engine)
    pub fn on_destroy(&mut self) {
        if self.lifecycle.is_terminated() {
            return;
        }
        self.lifecycle.send(DESTROY);
        if let Some(launch) = &self.launch {
            launch.cancel();
        }
        tracing::info!("shell destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::TextView;

    struct FixedBridge;

    impl NativeBridge for FixedBridge {
        fn version(&self) -> Result<String> {
            Ok("test".to_string())
        }

        fn native_init(&self) -> Result<()> {
            Ok(())
        }

        fn start(&self) -> Result<()> {
            Ok(())
        }
    }

    fn quick_config() -> ShellConfig {
        ShellConfig {
            launch_delay_ms: 0,
            ..ShellConfig::default()
        }
    }

    #[test]
    fn test_lifecycle_runs_created_running_destroyed() {
        let mut ui = UiThread::new(TextView::default());
        let mut shell = Shell::new(quick_config(), Arc::new(FixedBridge)).unwrap();
        assert_eq!(shell.lifecycle(), Lifecycle::Created);

        let launch = shell.on_create(&mut ui).unwrap();
        assert_eq!(shell.lifecycle(), Lifecycle::Running);
        launch.join();

        shell.on_destroy();
        assert_eq!(shell.lifecycle(), Lifecycle::Destroyed);
    }

    #[test]
    fn test_second_on_create_is_rejected() {
        let mut ui = UiThread::new(TextView::default());
        let mut shell = Shell::new(quick_config(), Arc::new(FixedBridge)).unwrap();

        shell.on_create(&mut ui).unwrap().join();
        let err = shell.on_create(&mut ui).unwrap_err();
        assert!(matches!(err, PlatformError::Lifecycle(_)));
    }

    #[test]
    fn test_on_create_after_destroy_is_rejected() {
        let mut ui = UiThread::new(TextView::default());
        let mut shell = Shell::new(quick_config(), Arc::new(FixedBridge)).unwrap();
        shell.on_destroy();

        assert!(shell.on_create(&mut ui).is_err());
        assert!(shell.launch().is_none());
    }

    #[test]
    fn test_window_and_label_setup() {
        let mut ui = UiThread::new(TextView::default());
        let config = ShellConfig {
            text_size: 32.0,
            ..quick_config()
        };
        let mut shell = Shell::new(config, Arc::new(FixedBridge)).unwrap();

        shell.on_create(&mut ui).unwrap().join();

        assert!(ui.window().fullscreen);
        assert!(!ui.window().show_title);
        assert_eq!(ui.view().text_size(), 32.0);
        assert_eq!(ui.view().gravity(), Gravity::Center);
        assert_eq!(ui.view().text(), "Kohksh SDL Game\nLoading...\n\ntest");
    }
}
