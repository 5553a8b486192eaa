//! Query-string parameters for list endpoints.

use serde::Deserialize;

use driftbox_core::types::{ListQuery, PageRequest, SortDirection, SortKey, SortSpec};
use driftbox_entity::ROOT_FOLDER_ID;

/// Raw query parameters accepted by the folder and file list endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    /// Parent folder to list. Defaults to the root.
    pub parent_id: Option<u64>,
    /// Case-insensitive substring to match against names.
    pub q: Option<String>,
    /// Restrict to starred records.
    pub starred: Option<bool>,
    pub sort_by: Option<SortKey>,
    pub sort_dir: Option<SortDirection>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

impl ListParams {
    /// Build the engine-level query.
    ///
    /// An absent `parent_id` scopes the listing to the root folder, except
    /// when filtering by starred: the favourites view spans the whole
    /// drive.
    pub fn into_query(self) -> ListQuery {
        let starred_only = self.starred.unwrap_or(false);
        let parent_id = match (self.parent_id, starred_only) {
            (Some(parent), _) => Some(parent),
            (None, true) => None,
            (None, false) => Some(ROOT_FOLDER_ID),
        };

        let sort = self.sort_by.map(|key| SortSpec {
            key,
            direction: self.sort_dir.unwrap_or_default(),
        });

        let page = match (self.page, self.per_page) {
            (None, None) => None,
            (page, per_page) => Some(PageRequest::new(
                page.unwrap_or(1),
                per_page.unwrap_or(20),
            )),
        };

        ListQuery {
            parent_id,
            search: self.q,
            starred_only,
            sort,
            page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_scope_to_root() {
        let query = ListParams::default().into_query();
        assert_eq!(query.parent_id, Some(ROOT_FOLDER_ID));
        assert!(!query.starred_only);
        assert!(query.page.is_none());
    }

    #[test]
    fn test_starred_without_parent_spans_drive() {
        let params = ListParams {
            starred: Some(true),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.parent_id, None);
        assert!(query.starred_only);
    }

    #[test]
    fn test_explicit_parent_wins_over_starred() {
        let params = ListParams {
            parent_id: Some(7),
            starred: Some(true),
            ..Default::default()
        };
        let query = params.into_query();
        assert_eq!(query.parent_id, Some(7));
    }

    #[test]
    fn test_partial_pagination_fills_defaults() {
        let params = ListParams {
            page: Some(3),
            ..Default::default()
        };
        let query = params.into_query();
        let page = query.page.unwrap();
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 20);
    }
}
