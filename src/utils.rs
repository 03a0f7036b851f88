//! Utility functions for monitoring and debugging.

use std::time::Instant;
use tracing::debug;

/// Measure the execution time of a closure and log it with a label.
/// Returns the value returned by the closure.
pub fn measure_time<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let start = Instant::now();
    let result = f();
    let elapsed = start.elapsed();
    debug!(
        "{} took: {:.2} ms",
        label,
        elapsed.as_secs_f64() * 1000.0
    );
    result
}
