//! Kohksh Android Platform
//!
//! Builds `libkohksh.so`: the native activity entry point and the JNI
//! methods `com.kohksh.MainActivity` declares.

pub mod bridge;
pub mod logging;

#[cfg(target_os = "android")]
pub mod activity;
#[cfg(target_os = "android")]
pub mod jni_exports;

pub use bridge::{guarded_entry, GlobalBridge, EXCEPTION_CLASS, LOG_TAG};
pub use logging::init_logging;
