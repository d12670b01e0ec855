//! Error types for Declutter operations.
//!
//! This module defines the main error type [`DeclutterError`] which represents
//! every way an operation can fail: reading the source, parsing it, writing
//! an artifact, or coming up empty.
//!
//! # Example
//!
//! ```rust
//! use declutter_core::{DeclutterError, Result};
//!
//! fn load(html: &str) -> Result<String> {
//!     if html.trim().is_empty() {
//!         return Err(DeclutterError::HtmlParseError("document is empty".into()));
//!     }
//!     Ok(html.to_string())
//! }
//! ```

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Main error type for document operations.
///
/// Parsing and I/O failures abort only the operation that raised them.
/// Callers running an interactive loop are expected to report the error
/// and carry on.
///
/// # Example
///
/// ```rust
/// use declutter_core::{DeclutterError, Session};
///
/// match Session::open("missing.html") {
///     Ok(session) => println!("Loaded {}", session.source().display()),
///     Err(DeclutterError::NotFound { path, .. }) => println!("No such file: {}", path.display()),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum DeclutterError {
    /// HTML parsing errors.
    ///
    /// The parser recovers from malformed markup, so this is only returned
    /// for empty input or when the pre-parse rewriter itself fails.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The source document does not exist or cannot be read.
    #[error("File not found or unreadable: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source bytes declare a character encoding that cannot be decoded.
    #[error("Invalid character encoding: {0}")]
    InvalidEncoding(String),

    /// An artifact could not be written to its destination.
    ///
    /// The destination is left untouched when this is returned.
    #[error("Failed to write to file {}: {source}", path.display())]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The content extractor rejected its input.
    #[error("Content extraction failed: {0}")]
    ExtractionError(String),

    /// An operation completed but produced nothing.
    ///
    /// Operations report this through [`OperationReport::notice`](crate::OperationReport)
    /// rather than failing; it only surfaces as an error under strict handling.
    #[error(transparent)]
    EmptyResult(#[from] EmptyResult),
}

/// Non-fatal outcome of an operation that found nothing to produce.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResult {
    /// The document contains no tables.
    #[error("No tables found in the document")]
    NoTables,

    /// The extractor found no main content.
    #[error("No content could be extracted from the document")]
    NoContent,
}

/// Result type alias for DeclutterError.
///
/// This is a convenience alias for `std::result::Result<T, DeclutterError>`.
pub type Result<T> = std::result::Result<T, DeclutterError>;
