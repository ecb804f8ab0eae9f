//! Advanced search: request parsing, narrowing and presentation queries

pub mod engine;
pub mod narrow;
pub mod params;
pub mod query_builder;

pub use engine::{SearchEngine, SearchResult};
pub use params::{build_search_criteria, parse_pagination, parse_sort};
pub use query_builder::{Pagination, ResolvedSort, SortDirection, SortKey, SortSpec};
