//! Logging setup for both `log` and `tracing`
//!
//! On Android everything goes to logcat under [`LOG_TAG`]. Host builds log
//! to stderr through an env-filtered fmt subscriber.

#[cfg(target_os = "android")]
use crate::bridge::LOG_TAG;

/// Route logging to logcat. Safe to call more than once.
#[cfg(target_os = "android")]
pub fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Debug)
            .with_tag(LOG_TAG),
    );

    use tracing_subscriber::layer::SubscriberExt;
    match tracing_android::layer(LOG_TAG) {
        Ok(layer) => {
            let subscriber = tracing_subscriber::registry().with(layer);
            let _ = tracing::subscriber::set_global_default(subscriber);
        }
        Err(e) => log::warn!("tracing-android layer unavailable: {}", e),
    }
}

/// Route logging to stderr. Safe to call more than once.
#[cfg(not(target_os = "android"))]
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
        assert!(tracing::dispatcher::has_been_set());
    }
}
