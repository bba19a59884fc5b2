//! Logging for the tsql workspace.
//!
//! All crates log through the macros in this crate, which forward to `emit`.
//! Output is controlled by the `TSQL_LOG` environment variable:
//! - `TSQL_LOG=off` (default) - no logs
//! - `TSQL_LOG=error` / `warn` - command failures and mapping warnings
//! - `TSQL_LOG=info` - datastore opens, command outcomes
//! - `TSQL_LOG=debug` - phase transitions and statement text

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable read by [`init_diagnostics`].
pub const LOG_ENV: &str = "TSQL_LOG";

static INIT: Once = Once::new();

/// Result of interpreting a `TSQL_LOG` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSetting {
    Off,
    Min(emit::Level),
    /// Unrecognized value, treated as `info`.
    Unknown,
}

pub fn parse_level(value: &str) -> LogSetting {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "off" => LogSetting::Off,
        "debug" => LogSetting::Min(emit::Level::Debug),
        "info" => LogSetting::Min(emit::Level::Info),
        "warn" => LogSetting::Min(emit::Level::Warn),
        "error" => LogSetting::Min(emit::Level::Error),
        _ => LogSetting::Unknown,
    }
}

/// Initialize diagnostics based on the `TSQL_LOG` environment variable.
///
/// Safe to call more than once; only the first call installs an emitter.
pub fn init_diagnostics() {
    INIT.call_once(|| {
        let value = std::env::var(LOG_ENV).unwrap_or_else(|_| "off".to_string());

        let level = match parse_level(&value) {
            LogSetting::Off => return,
            LogSetting::Min(level) => level,
            LogSetting::Unknown => {
                // Bootstrap warning, the emitter is not installed yet.
                eprintln!("Warning: Unknown {LOG_ENV} value '{value}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(level))
            .init();

        // The runtime lives for the whole process.
        std::mem::forget(rt);
    });
}

/// Log basic operations (datastore opened, command finished, table stored).
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (phase transitions, statement text, row counts).
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log recoverable conditions (mapping warnings, unresolved properties).
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log command failures.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_safe_to_call_multiple_times() {
        init_diagnostics();
        init_diagnostics();
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("off"), LogSetting::Off);
        assert_eq!(parse_level(""), LogSetting::Off);
        assert_eq!(parse_level("DEBUG"), LogSetting::Min(emit::Level::Debug));
        assert_eq!(parse_level(" warn "), LogSetting::Min(emit::Level::Warn));
        assert_eq!(parse_level("verbose"), LogSetting::Unknown);
    }

    #[test]
    fn test_macros_compile() {
        log_info!("Test message");
        log_debug!("Debug message with {value}", value: 42);
        log_warn!("Warning message");
        log_error!("Error message");

        let table = "obs";
        info!("Stored table {table}", table: table);
        debug!("Rows {count}", count: 2);
        warn!("Warning message");
        error!("Error message");
    }
}
