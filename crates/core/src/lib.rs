pub mod clean;
pub mod dom;
pub mod error;
pub mod extractor;
pub mod output;
pub mod parse;
pub mod pipeline;
pub mod serialize;
pub mod session;
pub mod tables;

pub use clean::{CleanConfig, CleanConfigBuilder, CleanStats, Exclusion, ExclusionPolicy, clean};
pub use dom::{DomTree, Element, Node, NodePath};
pub use error::{DeclutterError, EmptyResult, Result};
pub use extractor::ContentExtractor;
#[cfg(feature = "readability")]
pub use extractor::ReadabilityExtractor;
pub use output::{ArtifactKind, OutputConfig, ProcessedOutput, write_output};
pub use parse::{decode_html, parse};
pub use pipeline::{
    ContentSource, Operation, OperationReport, Pipeline, PipelineConfig, Selection, clean_html, remove_tables_html,
    separate_tables_html,
};
pub use serialize::{serialize, serialize_element, serialize_node};
pub use session::Session;
pub use tables::{TableExtract, extract_tables, is_table_root, locate_tables, remove_tables};
