//! pydoc-md - Generate Markdown API docs from Python sources
//!
//! Extracts the public functions and classes of every Python module under
//! a source root and writes one Markdown page per module into a mirrored
//! directory tree, plus a nested navigation index.

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod parser;
pub mod tree;

// Re-export main types
pub use config::{Config, EmptyDirs, ParseErrorPolicy};
pub use error::{Error, Result};
pub use output::{DocGenerator, GenerationReport, PageRenderer, Placeholders, SummaryEntry, Templates};
pub use parser::{Class, Element, Function, Parameter, ParameterList, PythonParser};
pub use tree::{Assembler, Assembly, DirectoryNode, FileSystem, MemoryFs, OsFs, SourceFilter};
