//! Native entry points consumed by the shell
//!
//! [`NativeBridge`] is the Rust face of the three JNI methods declared on
//! `com.kohksh.MainActivity`. The engine crate provides the real
//! implementation; tests substitute recording doubles.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{PlatformError, Result};

/// JNI method names, used for logging and error context
pub const GET_VERSION: &str = "getVersion";
pub const NATIVE_INIT: &str = "nativeInit";
pub const START_KOHKSH: &str = "startKohksh";

/// The native library as seen from the shell
pub trait NativeBridge: Send + Sync {
    /// Version string shown under the greeting
    fn version(&self) -> Result<String>;

    /// Prepare engine-side state. Called once, before [`start`](Self::start).
    fn native_init(&self) -> Result<()>;

    /// Start the engine. May block for the lifetime of the engine loop.
    fn start(&self) -> Result<()>;

    /// Ask a running engine to wind down so a blocking `start` returns
    fn request_stop(&self) {}
}

/// Run a native call, turning a panic into [`PlatformError::Native`]
pub fn call_guarded<T, F>(call: &'static str, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(PlatformError::native(call, panic_message(payload.as_ref()))),
    }
}

/// Best-effort text of a panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", msg)
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {}", msg)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_guarded_passes_results_through() {
        assert_eq!(call_guarded(GET_VERSION, || Ok(7)).unwrap(), 7);

        let err = call_guarded::<(), _>(NATIVE_INIT, || {
            Err(PlatformError::native(NATIVE_INIT, "no surface"))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Native call `nativeInit` failed: no surface");
    }

    #[test]
    fn test_call_guarded_catches_panics() {
        let err = call_guarded::<(), _>(START_KOHKSH, || panic!("engine exploded")).unwrap_err();
        match err {
            PlatformError::Native { call, message } => {
                assert_eq!(call, START_KOHKSH);
                assert_eq!(message, "panicked: engine exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
