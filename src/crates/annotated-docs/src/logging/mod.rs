//! Logging helpers
//!
//! The crate only emits `tracing` events; installing a subscriber is left to
//! the application.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// RAII guard logging entry into and exit from a describe or invoke operation
///
/// # Example
///
/// ```rust
/// use annotated_docs::logging::OperationGuard;
///
/// fn describe() {
///     let _guard = OperationGuard::new("as_json_schema", "get_weather");
///     // exit and elapsed time are logged when the guard drops
/// }
/// ```
pub struct OperationGuard {
    operation: &'static str,
    function: String,
    start: Instant,
}

impl OperationGuard {
    pub fn new(operation: &'static str, function: impl Into<String>) -> Self {
        let function = function.into();
        trace!(operation, function = %function, "entering");

        Self {
            operation,
            function,
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        debug!(
            operation = self.operation,
            function = %self.function,
            elapsed = %format_duration(self.start.elapsed()),
            "completed"
        );
    }
}

/// Format a duration in human-readable form
///
/// # Example
///
/// ```rust
/// use annotated_docs::logging::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(format_duration(Duration::from_micros(250)), "250μs");
/// assert_eq!(format_duration(Duration::from_millis(12)), "12ms");
/// assert_eq!(format_duration(Duration::from_millis(2500)), "2.50s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    match micros {
        0..=999 => format!("{micros}μs"),
        1_000..=999_999 => format!("{}ms", micros / 1_000),
        _ => format!("{:.2}s", duration.as_secs_f64()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(999)), "999μs");
        assert_eq!(format_duration(Duration::from_millis(1)), "1ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_secs(90)), "90.00s");
    }

    #[test]
    fn test_guard_elapsed() {
        let guard = OperationGuard::new("call_with_json", "sleepy");
        std::thread::sleep(Duration::from_millis(5));
        assert!(guard.elapsed() >= Duration::from_millis(5));
    }
}
