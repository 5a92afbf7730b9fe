//! # case-ingest
//!
//! Ingestion pipeline for third-party design "case" pages.
//!
//! Given a URL and a platform tag, the pipeline retrieves the page (full
//! browser render with a plain-HTTP fallback), isolates and sanitizes the
//! visually-relevant content, selects a representative cover image, and
//! normalizes the descriptive text — producing one canonical record shape
//! regardless of whether the source was a JSON API (Mana) or scraped HTML
//! (Behance).
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use case_ingest::{parse_case, FetchOptions, Platform};
//!
//! # async fn run() -> case_ingest::Result<()> {
//! let record = parse_case(
//!     Platform::Behance,
//!     "https://www.behance.net/gallery/123456/some-project",
//!     &FetchOptions::default(),
//! )
//! .await?;
//! println!("{}: {} images", record.title, record.candidate_image_urls.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Degradation model
//!
//! Third-party markup drifts, so every extraction runs through ordered
//! fallback chains and partial results are normal: an empty cover URL or a
//! placeholder description is an editable draft, not an error. Only
//! identifier extraction, retrieval, and title extraction can fail a parse
//! outright; each parser wraps such failures with its platform name.

mod error;
mod options;
mod record;

/// HTML fragment normalization into structure-preserving plain text.
pub mod normalize;

/// Content-module isolation and sanitization for scraped pages.
pub mod modules;

/// Cover-image selection heuristics.
pub mod cover;

/// Page retrieval: rendered fetch with plain-HTTP fallback.
pub mod fetch;

/// Per-platform parsers and dispatch.
pub mod platform;

/// URL qualification helpers.
pub mod url_utils;

// Public API - re-exports
pub use error::{Error, Result};
pub use fetch::FetchedDocument;
pub use options::{FetchOptions, DEFAULT_USER_AGENT};
pub use platform::parse_case;
pub use record::{CanonicalCaseRecord, Platform};
