//! Main-content extraction boundary.
//!
//! The pipeline only needs "HTML in, readable text out". The default
//! implementation runs a Readability port; anything else implementing
//! [`ContentExtractor`] (including a plain closure) can stand in for it.

use crate::Result;

/// Reduces an HTML document to its principal readable text.
///
/// Returning an empty string means nothing worth extracting was found; it
/// is not an error.
pub trait ContentExtractor {
    fn extract_main_content(&self, html: &str) -> Result<String>;
}

impl<F> ContentExtractor for F
where
    F: Fn(&str) -> Result<String>,
{
    fn extract_main_content(&self, html: &str) -> Result<String> {
        self(html)
    }
}

#[cfg(feature = "readability")]
pub use readability::ReadabilityExtractor;

#[cfg(feature = "readability")]
mod readability {
    use dom_smoothie::{Config, Readability};

    use super::ContentExtractor;
    use crate::{DeclutterError, Result};

    /// Extractor backed by `dom_smoothie`'s Readability implementation.
    #[derive(Debug, Clone, Default)]
    pub struct ReadabilityExtractor;

    impl ReadabilityExtractor {
        pub fn new() -> Self {
            Self
        }
    }

    impl ContentExtractor for ReadabilityExtractor {
        fn extract_main_content(&self, html: &str) -> Result<String> {
            let mut readability =
                Readability::new(html, None, Some(Config::default())).map_err(|e| DeclutterError::ExtractionError(e.to_string()))?;

            match readability.parse() {
                Ok(article) => Ok(article.text_content.trim().to_string()),
                Err(e) => {
                    tracing::warn!(error = %e, "no article could be extracted");
                    Ok(String::new())
                }
            }
        }
    }
}
