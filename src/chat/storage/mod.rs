//! Storage: workspace discovery and read-only store access.

pub mod locator;
pub mod store_reader;

pub use locator::WorkspaceLocator;
pub use store_reader::StoreReader;
