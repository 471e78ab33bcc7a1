//! Process-wide runtime installation
//!
//! Runs in its own test binary so no other test touches the global first.
//! These tests verify that:
//! - A configured runtime can be installed once and is what `global()` returns
//! - A second install is refused and leaves the first in place

use kohksh_engine::{EngineSettings, KohkshRuntime};
use kohksh_platform::{EngineMode, NativeBridge, PlatformError};

#[test]
fn test_install_global_once() {
    let settings = EngineSettings {
        target_fps: 1000,
        max_frames: Some(2),
        ..EngineSettings::default()
    };
    let installed =
        KohkshRuntime::install_global(KohkshRuntime::new(settings, EngineMode::Detached)).unwrap();
    assert_eq!(installed.mode(), EngineMode::Detached);
    assert!(std::ptr::eq(installed, KohkshRuntime::global()));

    let second = KohkshRuntime::install_global(KohkshRuntime::new(
        EngineSettings::default(),
        EngineMode::Blocking,
    ));
    assert!(matches!(second, Err(PlatformError::Lifecycle(_))));
    assert_eq!(KohkshRuntime::global().mode(), EngineMode::Detached);

    // The installed settings drive the engine
    let global = KohkshRuntime::global();
    global.native_init().unwrap();
    global.start().unwrap();
    global.join_detached();
    assert_eq!(global.frames(), 2);
}
