//! Redaction of respondent-level values in log output.
//!
//! IP addresses and identifiers are only written to logs after row-level
//! logging has been switched on explicitly (`--log-data`).

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when row-level logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

/// Enable or disable row-level logging for the whole process.
pub fn set_log_data(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

/// Returns true if row-level logging is explicitly enabled.
pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// Returns the input value when row-level logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction_toggle() {
        set_log_data(false);
        assert_eq!(redact_value("1.2.3.4"), REDACTED_VALUE);
        set_log_data(true);
        assert_eq!(redact_value("1.2.3.4"), "1.2.3.4");
        set_log_data(false);
    }
}
