//! Logging shims
//!
//! The crate logs through `tracing` by default; enabling only the `log` feature
//! routes the same call sites to the `log` crate instead.

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::debug!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::debug!($($arg)*);
    }};
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::info!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::info!($($arg)*);
    }};
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "tracing")]
        ::tracing::warn!($($arg)*);
        #[cfg(all(feature = "log", not(feature = "tracing")))]
        ::log::warn!($($arg)*);
    }};
}

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to `level`.
///
/// Returns `false` if a global subscriber was already set.
#[cfg(feature = "tracing-subscriber")]
pub fn init(level: &str) -> bool {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .try_init()
        .is_ok()
}
