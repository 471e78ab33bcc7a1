//! Glue between the Java-facing entry points and the process runtime

use kohksh_engine::KohkshRuntime;
use kohksh_platform::{call_guarded, NativeBridge, Result};

/// Logcat tag for everything the library logs
pub const LOG_TAG: &str = "Kohksh";

/// Thrown into Java when a native entry point fails
pub const EXCEPTION_CLASS: &str = "java/lang/RuntimeException";

/// [`NativeBridge`] over [`KohkshRuntime::global`], so the activity shell and
/// the JNI exports drive the same engine
#[derive(Clone, Copy, Debug, Default)]
pub struct GlobalBridge;

impl NativeBridge for GlobalBridge {
    fn version(&self) -> Result<String> {
        KohkshRuntime::global().version()
    }

    fn native_init(&self) -> Result<()> {
        KohkshRuntime::global().native_init()
    }

    fn start(&self) -> Result<()> {
        KohkshRuntime::global().start()
    }

    fn request_stop(&self) {
        KohkshRuntime::global().request_stop()
    }
}

/// Run an exported entry point with panics contained.
///
/// The error is the message for the Java exception.
pub fn guarded_entry<T>(
    call: &'static str,
    f: impl FnOnce() -> Result<T>,
) -> std::result::Result<T, String> {
    call_guarded(call, f).map_err(|e| {
        tracing::error!("{}", e);
        e.to_string()
    })
}
