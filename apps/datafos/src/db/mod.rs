//! Database layer - storage and search

pub mod schema;
pub mod search;
pub mod store;
pub mod traits;

pub use schema::ensure_schema;
pub use search::{SearchEngine, SearchResult};
pub use store::SqliteRecordStore;
pub use traits::RecordStore;
