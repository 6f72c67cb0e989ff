// Source tree traversal and mirroring

pub mod assembler;
pub mod fs;
pub mod node;

pub use assembler::*;
pub use fs::*;
pub use node::*;
