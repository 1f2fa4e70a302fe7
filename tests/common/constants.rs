//! Shared constants for end-to-end tests

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for a spawned server to answer
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout applied to every test client request
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Server Settings
// ============================================================================

/// Buffer capacity of test servers, small enough to exercise eviction
pub const TEST_BUFFER_CAPACITY: usize = 64;

/// Number of samples produced by `/api/testData` on test servers
pub const TEST_DATA_SAMPLE_COUNT: usize = 40;

/// Fixed seed so generated test batches are reproducible
pub const TEST_DATA_SEED: u64 = 7;

// ============================================================================
// Motion Fixtures
// ============================================================================

/// A resting phone: gravity on the z axis only
pub const RESTING: [f64; 3] = [0.0, 0.0, 1.0];

/// A moderate shake with magnitude exactly 1.3
pub const SHAKE: [f64; 3] = [0.5, 1.2, 0.0];

/// Gentle motion with magnitude 0.6, below the sustained-low level
pub const LOW_MOTION: [f64; 3] = [0.0, 0.0, 0.6];
