//! List-query options shared by folder and file listings.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pagination::PageRequest;
use super::sorting::{SortKey, SortSpec};

/// Options recognized by the query engine.
///
/// All filters are optional; an empty query returns the sequence in
/// storage (insertion) order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListQuery {
    /// Keep only records directly under this parent. `None` lists all.
    pub parent_id: Option<u64>,
    /// Case-insensitive substring match against the record name.
    pub search: Option<String>,
    /// Keep only starred records when `true`.
    pub starred_only: bool,
    /// Sort field and direction. `None` preserves storage order.
    pub sort: Option<SortSpec>,
    /// Pagination window, applied after filter and sort.
    pub page: Option<PageRequest>,
}

impl ListQuery {
    /// Query for the direct children of a folder, in storage order.
    pub fn children_of(parent_id: u64) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::default()
        }
    }
}

/// A value extracted from a record for sorting.
///
/// Values of different shapes (or missing values) compare equal, so a
/// stable sort leaves their relative order untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum SortValue {
    /// A string field.
    Text(String),
    /// An integer field.
    Number(u64),
    /// A timestamp field.
    Time(DateTime<Utc>),
    /// A boolean field.
    Flag(bool),
}

impl SortValue {
    /// Total comparison between two sort values; mismatched shapes tie.
    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            (Self::Flag(a), Self::Flag(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Accessors the query engine needs from a listable record.
///
/// Implemented by both folders and files so one engine serves both
/// namespaces.
pub trait ListItem {
    /// Display name used for search and name sorting.
    fn item_name(&self) -> &str;
    /// Id of the containing folder (`0` for root).
    fn item_parent(&self) -> u64;
    /// Starred flag.
    fn item_starred(&self) -> bool;
    /// Value backing the given sort key, if the record carries that field.
    fn sort_value(&self, key: SortKey) -> Option<SortValue>;
}
