//! Shared pagination, sorting, and query types.

pub mod pagination;
pub mod query;
pub mod sorting;

pub use pagination::PageRequest;
pub use query::{ListItem, ListQuery, SortValue};
pub use sorting::{SortDirection, SortKey, SortSpec};
