//! Tracing and logging setup shared by every binary and test harness.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::ObservabilityConfig;

/// Initialize process-wide tracing from the given configuration.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init(config: &ObservabilityConfig) {
    self::tracing::init(config);
}

/// Initialize process-wide tracing from environment variables.
pub fn init_default() {
    init(&ObservabilityConfig::from_env());
}
