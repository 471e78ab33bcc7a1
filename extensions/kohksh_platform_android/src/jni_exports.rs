//! `com.kohksh.MainActivity` native methods
//!
//! ```java
//! public native String getVersion();
//! public native void nativeInit();
//! public native void startKohksh();
//! ```
//!
//! Failures raise `RuntimeException` in the caller; panics never cross
//! the boundary. Logging is set up in `JNI_OnLoad`, before any of them run.

use std::ffi::c_void;

use jni::objects::JObject;
use jni::sys::{jint, jstring, JNI_VERSION_1_6};
use jni::{JNIEnv, JavaVM};
use kohksh_platform::bridge::{GET_VERSION, NATIVE_INIT, START_KOHKSH};
use kohksh_platform::NativeBridge;

use crate::bridge::{guarded_entry, GlobalBridge, EXCEPTION_CLASS};
use crate::logging::init_logging;

/// Called by `System.loadLibrary("kohksh")`
#[no_mangle]
pub extern "system" fn JNI_OnLoad(_vm: JavaVM, _reserved: *mut c_void) -> jint {
    init_logging();
    tracing::info!("libkohksh loaded");
    JNI_VERSION_1_6
}

fn throw(env: &mut JNIEnv, message: &str) {
    if let Err(e) = env.throw_new(EXCEPTION_CLASS, message) {
        tracing::error!("failed to raise {}: {}", EXCEPTION_CLASS, e);
    }
}

#[no_mangle]
pub extern "system" fn Java_com_kohksh_MainActivity_getVersion<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) -> jstring {
    let version = match guarded_entry(GET_VERSION, || GlobalBridge.version()) {
        Ok(version) => version,
        Err(message) => {
            throw(&mut env, &message);
            return std::ptr::null_mut();
        }
    };

    match env.new_string(version) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            tracing::error!("{}: could not allocate Java string: {}", GET_VERSION, e);
            std::ptr::null_mut()
        }
    }
}

#[no_mangle]
pub extern "system" fn Java_com_kohksh_MainActivity_nativeInit<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    if let Err(message) = guarded_entry(NATIVE_INIT, || GlobalBridge.native_init()) {
        throw(&mut env, &message);
    }
}

#[no_mangle]
pub extern "system" fn Java_com_kohksh_MainActivity_startKohksh<'local>(
    mut env: JNIEnv<'local>,
    _this: JObject<'local>,
) {
    if let Err(message) = guarded_entry(START_KOHKSH, || GlobalBridge.start()) {
        throw(&mut env, &message);
    }
}
