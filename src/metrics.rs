//! Console operation counters
//!
//! Recorded through the `metrics` facade; whichever recorder the embedding
//! application installs picks them up.

/// Record a launch attempt
pub fn record_launch_attempt(model_type: &str) {
    metrics::counter!("launch_console_launch_attempts_total",
        "model_type" => model_type.to_string()
    )
    .increment(1);
}

/// Record a failed launch
pub fn record_launch_failure(model_type: &str) {
    metrics::counter!("launch_console_launch_failures_total",
        "model_type" => model_type.to_string()
    )
    .increment(1);
}

/// Record a deleted custom registration
pub fn record_registration_deleted(model_type: &str) {
    metrics::counter!("launch_console_registrations_deleted_total",
        "model_type" => model_type.to_string()
    )
    .increment(1);
}
