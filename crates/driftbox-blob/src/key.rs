//! Blob key derivation.
//!
//! Every stored blob is keyed by the owning file's id plus a normalized
//! form of its original name. The id prefix keeps keys unique even when
//! two uploads share a name.

/// Normalize an upload name for use in a blob key: lowercase, whitespace
/// collapsed to single hyphens. An empty result falls back to `"file"`.
pub fn normalize_name(name: &str) -> String {
    let normalized = name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    if normalized.is_empty() {
        "file".to_string()
    } else {
        normalized
    }
}

/// Key of the blob backing file `id` with original name `name`.
pub fn blob_key(id: u64, name: &str) -> String {
    format!("{id}-{}", normalize_name(name))
}
