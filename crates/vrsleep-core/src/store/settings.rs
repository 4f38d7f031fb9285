use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::types::MessageType;

const FILE_NAME: &str = "settings.json";

/// User preferences, persisted as one JSON object. Unknown keys are dropped
/// on load and missing keys fall back to the defaults below, so settings
/// added in app updates are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Status to broadcast while sleep mode is active; `"none"` means no
    /// override.
    pub sleep_status: String,
    pub sleep_status_description: String,
    /// Slot attached to auto-sent invites when the feature is on.
    pub invite_message_slot: u8,
    pub invite_message_type: MessageType,
    pub auto_status_enabled: bool,
    pub invite_message_enabled: bool,
    /// Last active UI tab, kept for UX continuity.
    pub active_tab: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sleep_status: "none".to_string(),
            sleep_status_description: String::new(),
            invite_message_slot: 0,
            invite_message_type: MessageType::Message,
            auto_status_enabled: false,
            invite_message_enabled: false,
            active_tab: "whitelist".to_string(),
        }
    }
}

impl Settings {
    /// True when a concrete status override is configured.
    pub fn has_status_override(&self) -> bool {
        !self.sleep_status.is_empty() && self.sleep_status != "none"
    }

    fn apply(&mut self, patch: SettingsPatch) {
        if let Some(value) = patch.sleep_status {
            self.sleep_status = value;
        }
        if let Some(value) = patch.sleep_status_description {
            self.sleep_status_description = value;
        }
        if let Some(value) = patch.invite_message_slot {
            self.invite_message_slot = value;
        }
        if let Some(value) = patch.invite_message_type {
            self.invite_message_type = value;
        }
        if let Some(value) = patch.auto_status_enabled {
            self.auto_status_enabled = value;
        }
        if let Some(value) = patch.invite_message_enabled {
            self.invite_message_enabled = value;
        }
        if let Some(value) = patch.active_tab {
            self.active_tab = value;
        }
    }
}

/// Partial settings update; absent fields leave the stored value unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub sleep_status: Option<String>,
    pub sleep_status_description: Option<String>,
    pub invite_message_slot: Option<u8>,
    pub invite_message_type: Option<MessageType>,
    pub auto_status_enabled: Option<bool>,
    pub invite_message_enabled: Option<bool>,
    pub active_tab: Option<String>,
}

/// Read-modify-write settings store. Every read merges the file over the
/// defaults; a corrupt file reads as the defaults rather than failing.
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
        }
    }

    pub fn get(&self) -> Settings {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default()
    }

    pub fn set(&self, patch: SettingsPatch) -> Settings {
        let mut next = self.get();
        next.apply(patch);
        match serde_json::to_string_pretty(&next) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    tracing::warn!("failed to save settings: {err}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize settings: {err}"),
        }
        next
    }
}
