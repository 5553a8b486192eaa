//! The query engine: pure filtering, sorting, and pagination over a
//! homogeneous sequence of records.

use std::cmp::Ordering;

use driftbox_core::types::{ListItem, ListQuery, SortDirection};

/// Apply a list query to a sequence of records.
///
/// Order of application: parent filter, name search, starred filter, sort,
/// pagination. The sort is stable: records that compare equal keep their
/// original relative (insertion) order. An out-of-range page yields an
/// empty sequence.
pub fn apply<T: ListItem>(items: Vec<T>, query: &ListQuery) -> Vec<T> {
    let term = query.search.as_ref().map(|s| s.to_lowercase());

    let mut out: Vec<T> = items
        .into_iter()
        .filter(|item| match query.parent_id {
            Some(parent) => item.item_parent() == parent,
            None => true,
        })
        .filter(|item| match &term {
            Some(term) => item.item_name().to_lowercase().contains(term),
            None => true,
        })
        .filter(|item| !query.starred_only || item.item_starred())
        .collect();

    if let Some(sort) = query.sort {
        out.sort_by(|a, b| {
            let ord = match (a.sort_value(sort.key), b.sort_value(sort.key)) {
                (Some(x), Some(y)) => x.compare(&y),
                _ => Ordering::Equal,
            };
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    match query.page {
        Some(page) => page.slice(out),
        None => out,
    }
}
