//! Mirror-fallback PDF fetching.
//!
//! This module retrieves exam-paper PDFs from third-party mirrors.
//!
//! # Features
//!
//! - Per-mirror request headers selected by [`MirrorKind`]
//! - Content validation (`%PDF` magic or a PDF content type) so HTML error
//!   pages served with 200 never pass as papers
//! - Success-URL memoization with re-validation on every use
//! - Bounded concurrent batches with partial-failure tolerance
//! - HEAD-based availability probes for diagnostics
//!
//! # Example
//!
//! ```no_run
//! use exampapers_core::fetch::{HeaderProfile, MirrorClient, FETCH_TIMEOUT};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = MirrorClient::new()?;
//! let profile = HeaderProfile::for_mirror("supercop");
//! if let Some(pdf) = client
//!     .fetch_from_url("https://files.supercop.in/paper.pdf", profile, FETCH_TIMEOUT)
//!     .await
//! {
//!     println!("fetched {} bytes", pdf.len());
//! }
//! # Ok(())
//! # }
//! ```

mod cache;
mod client;
mod constants;
mod engine;
mod error;
mod mirror;

pub use cache::{CachedSource, SuccessCache};
pub use client::{MirrorClient, looks_like_pdf};
pub use constants::{
    CONNECT_TIMEOUT, DEFAULT_BATCH_CONCURRENCY, DEFAULT_POOL_SIZE, FETCH_TIMEOUT, PDF_MAGIC,
    PROBE_TIMEOUT,
};
pub use engine::{
    EngineError, FetchConfig, FetchEngine, FetchOutcome, MAX_CONCURRENCY, MIN_CONCURRENCY,
    MirrorStatus,
};
pub use error::FetchError;
pub use mirror::{BROWSER_USER_AGENT, HeaderProfile, MirrorKind, PDF_ACCEPT};
