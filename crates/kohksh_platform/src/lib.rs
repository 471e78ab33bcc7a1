//! Kohksh Platform Shell
//!
//! The loading-screen shell that sits in front of the native engine:
//! fullscreen window, a single centered label, and a delayed, cancellable
//! handoff to `nativeInit` / `startKohksh`.
//!
//! # Architecture
//!
//! - [`Shell`] drives the activity lifecycle (created -> running -> destroyed)
//! - [`UiThread`] owns the label; other threads post through a [`UiHandle`]
//! - [`LaunchHandle`] is the single scheduled launch task
//! - [`NativeBridge`] abstracts the native library
//!
//! # Usage
//!
//! ```ignore
//! let mut ui = UiThread::new(TextView::default());
//! let mut shell = Shell::new(ShellConfig::default(), bridge)?;
//! let launch = shell.on_create(&mut ui)?;
//! while !launch.is_finished() {
//!     ui.pump_timeout(Duration::from_millis(16));
//! }
//! ```

pub mod bridge;
pub mod config;
pub mod error;
pub mod launch;
pub mod shell;
pub mod ui;
pub mod window;

pub use bridge::{call_guarded, NativeBridge};
pub use config::{EngineMode, ShellConfig};
pub use error::{PlatformError, Result};
pub use launch::{LaunchHandle, LaunchOutcome, LaunchPhase};
pub use shell::{Lifecycle, Shell};
pub use ui::{Gravity, TextView, UiCommand, UiHandle, UiThread};
pub use window::WindowConfig;
