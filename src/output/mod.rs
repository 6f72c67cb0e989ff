// Output generation module

pub mod generator;
pub mod page;
pub mod summary;
pub mod templates;

pub use generator::*;
pub use page::*;
pub use summary::*;
pub use templates::*;
