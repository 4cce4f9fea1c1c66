//! Constants for the download module (timeouts, fan-out limits).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout (5 minutes for large resources).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Default number of resources fetched or written at the same time.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 100;
