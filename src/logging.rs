//! Logging macros
//!
//! The navigator logs through these macros so the backend can be picked at
//! compile time:
//!
//! - `log` (default) - forwards to the `log` facade
//! - `tracing` - forwards to `tracing` events
//!
//! Enable exactly one. With neither enabled the macros expand to nothing.
//!
//! # Usage
//!
//! ```ignore
//! use spa_navigator::{debug_log, error_log};
//!
//! debug_log!("cycle #{} resolving '{}'", seq, path);
//! error_log!("{}", RouterError::ContainerNotFound { locator: "#app".into() });
//! ```

/// Trace-level logging (registration, cycle boundaries, cache hits)
#[macro_export]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::trace!(target: "spa_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::trace!(target: "spa_navigator", $($arg)*);
    };
}

/// Debug-level logging (guard aborts, redirects, superseded cycles)
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::debug!(target: "spa_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::debug!(target: "spa_navigator", $($arg)*);
    };
}

/// Info-level logging
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::info!(target: "spa_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::info!(target: "spa_navigator", $($arg)*);
    };
}

/// Warn-level logging
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::warn!(target: "spa_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::warn!(target: "spa_navigator", $($arg)*);
    };
}

/// Error-level logging (missing mount point, contained handler failures)
#[macro_export]
macro_rules! error_log {
    ($($arg:tt)*) => {
        #[cfg(feature = "tracing")]
        ::tracing::error!(target: "spa_navigator", $($arg)*);
        #[cfg(feature = "log")]
        ::log::error!(target: "spa_navigator", $($arg)*);
    };
}
