//! Constants for the fetch module (timeouts, concurrency policy).

use std::time::Duration;

/// Per-request timeout for PDF downloads.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-request timeout for availability probes.
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP connect timeout applied by the shared client.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum redirects followed per request.
pub const MAX_REDIRECTS: usize = 10;

/// First bytes of every PDF document.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Default size of the engine-wide fetch pool.
pub const DEFAULT_POOL_SIZE: usize = 20;

/// Default per-call bound for ZIP batches.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 10;
