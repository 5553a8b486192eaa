//! Response payloads.

use serde::Serialize;

use driftbox_entity::File;

/// A file record enriched with its download URL.
#[derive(Debug, Serialize)]
pub struct FileResponse {
    #[serde(flatten)]
    pub file: File,
    pub url: String,
}

impl FileResponse {
    pub fn new(file: File, public_url: &str) -> Self {
        let url = format!(
            "{}/api/files/{}/download",
            public_url.trim_end_matches('/'),
            file.id
        );
        Self { file, url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_download_url_shape() {
        let file = File {
            id: 7,
            name: "a.txt".to_string(),
            mime_type: None,
            storage_ref: "7-a.txt".to_string(),
            parent_id: 0,
            starred: false,
            created_at: Utc::now(),
        };

        let resp = FileResponse::new(file, "http://localhost:3030/");
        assert_eq!(resp.url, "http://localhost:3030/api/files/7/download");
    }
}
