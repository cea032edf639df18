//! Engine: the public reader facade.

pub mod reader;

pub use reader::ChatReader;
