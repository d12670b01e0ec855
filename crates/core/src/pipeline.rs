//! The four document operations and the pipeline that runs them.
//!
//! # Example
//!
//! ```rust,no_run
//! use declutter_core::{Operation, Pipeline, PipelineConfig, Result, Session};
//!
//! let pipeline = Pipeline::new(PipelineConfig::default(), |html: &str| -> Result<String> { Ok(html.to_string()) });
//! let session = Session::open("page.html")?;
//! let report = pipeline.run(&session, Operation::SeparateTables)?;
//! for path in &report.outputs {
//!     println!("wrote {}", path.display());
//! }
//! # Ok::<(), declutter_core::DeclutterError>(())
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::clean::{CleanConfig, ExclusionPolicy, clean};
use crate::extractor::ContentExtractor;
use crate::output::{ArtifactKind, OutputConfig, ProcessedOutput, write_outputs};
use crate::serialize::serialize;
use crate::session::Session;
use crate::tables::{TableExtract, extract_tables, remove_tables};
use crate::{DeclutterError, EmptyResult, Result};

/// An operation on the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// `0`: write a decluttered copy
    Clean,
    /// `1`: write a copy without tables
    RemoveTables,
    /// `2`: write the tables and the page without them
    SeparateTables,
    /// `3`: write the extracted main content
    SaveContent,
}

impl Operation {
    pub const ALL: [Operation; 4] =
        [Operation::Clean, Operation::RemoveTables, Operation::SeparateTables, Operation::SaveContent];

    /// Menu number of the operation.
    pub fn number(self) -> u8 {
        match self {
            Operation::Clean => 0,
            Operation::RemoveTables => 1,
            Operation::SeparateTables => 2,
            Operation::SaveContent => 3,
        }
    }

    /// Human readable menu label.
    pub fn label(self) -> &'static str {
        match self {
            Operation::Clean => "Just cleaned HTML content",
            Operation::RemoveTables => "Remove tables",
            Operation::SeparateTables => "Separate tables (also removes tables)",
            Operation::SaveContent => "Save content",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Clean => "clean",
            Operation::RemoveTables => "remove_tables",
            Operation::SeparateTables => "separate_tables",
            Operation::SaveContent => "save_content",
        };
        f.write_str(name)
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "clean" => Ok(Self::Clean),
            "1" | "remove_tables" | "remove-tables" => Ok(Self::RemoveTables),
            "2" | "separate_tables" | "separate-tables" => Ok(Self::SeparateTables),
            "3" | "save_content" | "save-content" => Ok(Self::SaveContent),
            _ => Err(format!("Invalid operation: {}. Valid options: 0, 1, 2, 3", s)),
        }
    }
}

/// A menu choice: an operation or the exit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Run(Operation),
    /// `4`: leave without running anything
    Exit,
}

impl Selection {
    pub const EXIT_NUMBER: u8 = 4;
}

impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "4" | "exit" | "quit" | "q" => Ok(Self::Exit),
            other => other
                .parse::<Operation>()
                .map(Self::Run)
                .map_err(|_| format!("Invalid selection: {}. Valid options: 0, 1, 2, 3, 4", s)),
        }
    }
}

/// Which HTML the content extractor receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentSource {
    /// The untouched source document
    #[default]
    Raw,
    /// The output of the cleaning rules
    Cleaned,
}

/// Configuration for a [`Pipeline`].
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub clean: CleanConfig,
    pub output: OutputConfig,
    pub content_source: ContentSource,
}

/// Outcome of a completed operation.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    pub operation: Operation,
    /// Files written, in the order they were written
    pub outputs: Vec<PathBuf>,
    /// Set when the operation found nothing to produce
    pub notice: Option<EmptyResult>,
}

impl OperationReport {
    /// Turns an empty result into an error.
    pub fn into_strict(self) -> Result<Self> {
        match self.notice {
            Some(empty) => Err(DeclutterError::EmptyResult(empty)),
            None => Ok(self),
        }
    }
}

/// Runs operations against sessions.
///
/// Each run parses the session's source afresh, so operations are
/// independent of each other and of the order they run in.
pub struct Pipeline {
    policy: ExclusionPolicy,
    output: OutputConfig,
    content_source: ContentSource,
    extractor: Box<dyn ContentExtractor>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, extractor: impl ContentExtractor + 'static) -> Self {
        Self {
            policy: ExclusionPolicy::from_config(&config.clean),
            output: config.output,
            content_source: config.content_source,
            extractor: Box::new(extractor),
        }
    }

    /// Creates a pipeline using the Readability extractor.
    #[cfg(feature = "readability")]
    pub fn with_readability(config: PipelineConfig) -> Self {
        Self::new(config, crate::ReadabilityExtractor::new())
    }

    /// Runs one operation and writes its artifacts.
    pub fn run(&self, session: &Session, operation: Operation) -> Result<OperationReport> {
        tracing::debug!(%operation, source = %session.source().display(), "running operation");
        match operation {
            Operation::Clean => self.clean(session),
            Operation::RemoveTables => self.remove_tables(session),
            Operation::SeparateTables => self.separate_tables(session),
            Operation::SaveContent => self.save_content(session),
        }
    }

    /// Writes `<stem>_cleaned.html`.
    pub fn clean(&self, session: &Session) -> Result<OperationReport> {
        let html = clean_html(session.raw_html(), &self.policy)?;
        let written = self.emit(session, ArtifactKind::Cleaned, html)?;
        Ok(report(Operation::Clean, vec![written], None))
    }

    /// Writes `<stem>_no_tables.html`.
    pub fn remove_tables(&self, session: &Session) -> Result<OperationReport> {
        let html = remove_tables_html(session.raw_html())?;
        let written = self.emit(session, ArtifactKind::NoTables, html)?;
        Ok(report(Operation::RemoveTables, vec![written], None))
    }

    /// Writes `<stem>_tables_only.html` and `<stem>_no_tables.html`.
    ///
    /// Both files are staged before either is moved into place, so a failure
    /// to write one leaves neither. With no tables in the source the tables
    /// file is written empty and the report carries [`EmptyResult::NoTables`].
    pub fn separate_tables(&self, session: &Session) -> Result<OperationReport> {
        let (page, tables) = separate_tables_html(session.raw_html())?;

        let notice = if tables.is_empty() {
            tracing::warn!(source = %session.source().display(), "no tables found to separate");
            Some(EmptyResult::NoTables)
        } else {
            None
        };

        let written = write_outputs(vec![
            self.artifact(session, ArtifactKind::TablesOnly, tables.to_html()),
            self.artifact(session, ArtifactKind::NoTables, page),
        ])?;
        Ok(report(Operation::SeparateTables, written, notice))
    }

    /// Writes `<stem>_content.txt`.
    ///
    /// The source must parse even when the extractor is given the raw HTML.
    pub fn save_content(&self, session: &Session) -> Result<OperationReport> {
        let content = match self.content_source {
            ContentSource::Raw => {
                session.parse()?;
                self.extractor.extract_main_content(session.raw_html())?
            }
            ContentSource::Cleaned => {
                let cleaned = clean_html(session.raw_html(), &self.policy)?;
                self.extractor.extract_main_content(&cleaned)?
            }
        };

        let notice = if content.trim().is_empty() {
            tracing::warn!(source = %session.source().display(), "no content could be extracted");
            Some(EmptyResult::NoContent)
        } else {
            None
        };

        let written = self.emit(session, ArtifactKind::Content, content)?;
        Ok(report(Operation::SaveContent, vec![written], notice))
    }

    fn artifact(&self, session: &Session, kind: ArtifactKind, content: String) -> ProcessedOutput {
        let destination = self.output.destination(session.source(), kind);
        ProcessedOutput::new(kind, content, destination)
    }

    fn emit(&self, session: &Session, kind: ArtifactKind, content: String) -> Result<PathBuf> {
        self.artifact(session, kind, content).write()
    }
}

fn report(operation: Operation, outputs: Vec<PathBuf>, notice: Option<EmptyResult>) -> OperationReport {
    OperationReport { operation, outputs, notice }
}

/// Parses and cleans `raw_html`, returning the serialized result.
pub fn clean_html(raw_html: &str, policy: &ExclusionPolicy) -> Result<String> {
    let mut tree = crate::parse(raw_html)?;
    clean(&mut tree, policy);
    Ok(serialize(&tree))
}

/// Parses `raw_html` and returns it serialized without tables.
pub fn remove_tables_html(raw_html: &str) -> Result<String> {
    let mut tree = crate::parse(raw_html)?;
    remove_tables(&mut tree);
    Ok(serialize(&tree))
}

/// Parses `raw_html` and splits it into the page without tables and the tables.
pub fn separate_tables_html(raw_html: &str) -> Result<(String, TableExtract)> {
    let mut tree = crate::parse(raw_html)?;
    let tables = extract_tables(&mut tree);
    Ok((serialize(&tree), tables))
}
