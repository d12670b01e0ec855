//! The source document an operation works on.

use std::fs;
use std::path::{Path, PathBuf};

use crate::dom::DomTree;
use crate::parse::{decode_html, parse};
use crate::{DeclutterError, Result};

/// A loaded source file.
///
/// Holds the path and the untouched HTML. Every call to [`Session::parse`]
/// builds a fresh tree, so one operation can never see another's edits.
#[derive(Debug, Clone)]
pub struct Session {
    source: PathBuf,
    raw_html: String,
}

impl Session {
    /// Reads and decodes the source file.
    ///
    /// # Errors
    ///
    /// Returns [`DeclutterError::NotFound`] if the file does not exist or
    /// cannot be read, and [`DeclutterError::InvalidEncoding`] if its
    /// declared charset is unknown.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DeclutterError::NotFound { path: path.to_path_buf(), source })?;
        let raw_html = decode_html(&bytes)?.into_owned();

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded source document");
        Ok(Self { source: path.to_path_buf(), raw_html })
    }

    /// Wraps HTML that is already in memory.
    pub fn from_html(source: impl Into<PathBuf>, raw_html: impl Into<String>) -> Self {
        Self { source: source.into(), raw_html: raw_html.into() }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn raw_html(&self) -> &str {
        &self.raw_html
    }

    /// Parses the source into a new tree.
    pub fn parse(&self) -> Result<DomTree> {
        parse(&self.raw_html)
    }
}
