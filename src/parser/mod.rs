// Parser module for extracting documented elements from source files

pub mod ast;
mod python;
pub mod signature;

pub use ast::*;
pub use python::PythonParser;
pub use signature::render_signature;
