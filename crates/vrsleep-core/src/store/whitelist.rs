use std::path::{Path, PathBuf};

const FILE_NAME: &str = "whitelist.json";

/// Normalize an identity for whitelist comparison: trimmed and lowercased.
pub fn normalize_entry(entry: &str) -> String {
    entry.trim().to_lowercase()
}

/// User-curated list of identities permitted to receive automatic invites,
/// persisted as a flat JSON array. Order is user-meaningful for display and
/// irrelevant for matching.
pub struct WhitelistStore {
    path: PathBuf,
}

impl WhitelistStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
        }
    }

    /// Raw entries as the user wrote them. A missing or corrupt file reads
    /// as an empty list.
    pub fn get(&self) -> Vec<String> {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn set(&self, list: Vec<String>) -> Vec<String> {
        match serde_json::to_string_pretty(&list) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    tracing::warn!("failed to save whitelist: {err}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize whitelist: {err}"),
        }
        list
    }

    /// Normalized entries ready for matching, with empty entries dropped.
    pub fn normalized(&self) -> Vec<String> {
        self.get()
            .iter()
            .map(|entry| normalize_entry(entry))
            .filter(|entry| !entry.is_empty())
            .collect()
    }
}
