//! Retrieval: titles, concepts, aggregation and search.

pub mod aggregator;
pub mod concepts;
pub mod search;
pub mod title_resolver;

pub use aggregator::dedupe_and_sort;
pub use concepts::ConceptCatalog;
pub use search::{matches_query, render_markdown};
pub use title_resolver::{TitleResolver, is_placeholder};
