//! # order-agent core
//!
//! Pure logic shared by the `order-agent` binary: catalog records, keyword
//! parsing, keyword filtering, prompt composition, argument escaping and
//! model-output cleanup.
//!
//! This crate performs no process spawning and no filesystem I/O. The
//! calling application reads files, runs the model and the ranker, and
//! feeds the text through these functions.

pub mod catalog;
pub mod keywords;
pub mod prompt;

pub use catalog::{
    Catalog, CatalogError, FilterError, FilteredResult, ProjectedRow, Projection, Record,
};
pub use keywords::KeywordSet;
pub use prompt::{clean_output, escape_argument, CleanupError, OutputTrim, PromptTemplate};
