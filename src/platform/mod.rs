//! Platform parsers.
//!
//! One parser per source platform, all converging on
//! [`CanonicalCaseRecord`](crate::record::CanonicalCaseRecord). The caller
//! supplies the platform tag; dispatch itself is trivial and unknown tags
//! are unrepresentable through the [`Platform`] enum.

pub mod behance;
pub mod mana;

use crate::error::Result;
use crate::options::FetchOptions;
use crate::record::{CanonicalCaseRecord, Platform};

/// Parse a case page into the canonical record for the given platform.
///
/// Each call is independent: no state is shared between invocations, so
/// calls may run concurrently (the rendered-fetch path is process-heavy;
/// callers wanting parallelism should cap it themselves).
pub async fn parse_case(
    platform: Platform,
    url: &str,
    options: &FetchOptions,
) -> Result<CanonicalCaseRecord> {
    match platform {
        Platform::Mana => mana::parse(url, options).await,
        Platform::Behance => behance::parse(url, options).await,
    }
}
