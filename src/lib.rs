//! Exam-paper catalog and mirror-fallback PDF fetch engine.
//!
//! Papers are fetched from an ordered list of third-party mirrors, each
//! with its own request headers. The first mirror that answers with a
//! real PDF wins and is remembered for the next request. Batches run
//! concurrently and are packaged into a ZIP even when some papers fail.
//!
//! # Architecture
//!
//! - [`catalog`] - Paper records, lookup, filtering and statistics
//! - [`fetch`] - Mirror-fallback fetch engine with success cache and bounded batches
//! - [`archive`] - ZIP assembly with placeholder PDFs for missing papers
//! - [`server`] - axum HTTP surface over the catalog and engine

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod archive;
pub mod catalog;
pub mod fetch;
pub mod server;

// Re-export commonly used types
pub use archive::{Archive, ArchiveError, PLACEHOLDER_PDF, UNAVAILABLE_PREFIX, build_zip};
pub use catalog::{Candidate, Catalog, CatalogError, PaperFilter, PaperRecord, PaperType};
pub use fetch::{
    EngineError, FetchConfig, FetchEngine, FetchOutcome, HeaderProfile, MirrorKind, MirrorStatus,
    SuccessCache,
};
pub use server::{AppState, ServerSettings, create_router};
