//! Source-level static analyzer for Cairo smart contracts.
//!
//! The pipeline never invokes a Cairo compiler: it extracts a contract IR
//! from source text with regexes (`extract`, `imports`, `version`), links
//! symbols across files in three passes (`linker`), parses function bodies
//! into a statement stream (`statement`), builds a CFG per function (`cfg`),
//! and runs dataflow analysis over it (`dataflow`). `facade` orchestrates
//! the last three stages per function and `report` shapes the result for
//! serialization.

pub mod cfg;
pub mod cli;
pub mod config;
pub mod dataflow;
pub mod error;
pub mod extract;
pub mod facade;
pub mod imports;
pub mod ir;
pub mod linker;
pub mod logging;
pub mod report;
pub mod statement;
pub mod version;
pub mod walker;

pub use config::Settings;
pub use error::{AnalyzerError, AnalyzerResult};
pub use linker::Linker;
