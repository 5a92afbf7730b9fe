//! Error types for case-ingest.
//!
//! This module defines the error types returned by parse operations.

/// Error type for case ingestion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A platform-specific identifier could not be derived from the URL.
    #[error("{platform}: could not extract an id from {url}")]
    IdExtraction {
        /// Platform the parse was attempted for.
        platform: &'static str,
        /// The offending URL.
        url: String,
    },

    /// Both the rendered fetch and the plain fetch failed, or the
    /// upstream returned a non-success status.
    #[error("retrieval failed: {0}")]
    Retrieval(String),

    /// The upstream API answered but its payload was unusable
    /// (missing `data`, undecodable body).
    #[error("unusable API response: {0}")]
    ApiShape(String),

    /// No usable title could be extracted from any fallback source.
    #[error("{platform}: no usable title found")]
    MissingTitle {
        /// Platform the parse was attempted for.
        platform: &'static str,
    },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failure.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Terminal parse failure, annotated with the platform it happened on.
    #[error("{platform} parse failed: {source}")]
    Parse {
        /// Platform the parse was attempted for.
        platform: &'static str,
        /// The underlying failure.
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a terminal failure with the platform name, unless the error
    /// already names one.
    pub(crate) fn for_platform(platform: &'static str, err: Error) -> Error {
        match err {
            already @ (Error::IdExtraction { .. }
            | Error::MissingTitle { .. }
            | Error::Parse { .. }) => already,
            other => Error::Parse {
                platform,
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for ingestion operations.
pub type Result<T> = std::result::Result<T, Error>;
