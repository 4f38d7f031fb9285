use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::api::types::{MessageType, SlotData, SLOT_COUNT};

const FILE_NAME: &str = "message-slots.json";

/// Local mirror of the 4×12 message templates plus the per-slot cooldown
/// unlock timestamps (epoch ms; 0 or past = unlocked), persisted as one JSON
/// object keyed by message type.
pub struct MessageSlotStore {
    path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
struct SlotFile {
    slots: BTreeMap<MessageType, Vec<String>>,
    cooldowns: BTreeMap<MessageType, BTreeMap<u8, u64>>,
}

impl Default for SlotFile {
    fn default() -> Self {
        let mut slots = BTreeMap::new();
        let mut cooldowns = BTreeMap::new();
        for message_type in MessageType::ALL {
            slots.insert(message_type, vec![String::new(); SLOT_COUNT as usize]);
            cooldowns.insert(message_type, BTreeMap::new());
        }
        Self { slots, cooldowns }
    }
}

impl SlotFile {
    /// Pad or truncate every slot list back to exactly 12 entries; a
    /// hand-edited or partially written file must not shift indices.
    fn normalize(mut self) -> Self {
        for message_type in MessageType::ALL {
            let entries = self.slots.entry(message_type).or_default();
            entries.resize(SLOT_COUNT as usize, String::new());
            self.cooldowns.entry(message_type).or_default();
        }
        self
    }
}

impl MessageSlotStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(FILE_NAME),
        }
    }

    fn get_data(&self) -> SlotFile {
        std::fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<SlotFile>(&raw).ok())
            .unwrap_or_default()
            .normalize()
    }

    fn save_data(&self, data: &SlotFile) {
        match serde_json::to_string_pretty(data) {
            Ok(json) => {
                if let Err(err) = std::fs::write(&self.path, json) {
                    tracing::warn!("failed to save message slots: {err}");
                }
            }
            Err(err) => tracing::warn!("failed to serialize message slots: {err}"),
        }
    }

    /// Last-known text of every slot, keyed by type.
    pub fn cached_slots(&self) -> BTreeMap<MessageType, Vec<String>> {
        self.get_data().slots
    }

    pub fn cached_slots_for(&self, message_type: MessageType) -> Vec<String> {
        self.get_data()
            .slots
            .remove(&message_type)
            .unwrap_or_else(|| vec![String::new(); SLOT_COUNT as usize])
    }

    pub fn update_cached_slot(&self, message_type: MessageType, slot: u8, message: &str) {
        let mut data = self.get_data();
        if let Some(entries) = data.slots.get_mut(&message_type) {
            if let Some(entry) = entries.get_mut(slot as usize) {
                *entry = message.to_string();
            }
        }
        self.save_data(&data);
    }

    /// Overwrite the full 12-slot state for a type from an authoritative
    /// vendor response.
    pub fn replace_cached_slots(&self, message_type: MessageType, slots: &[SlotData]) {
        let mut data = self.get_data();
        let mut entries = vec![String::new(); SLOT_COUNT as usize];
        for slot in slots {
            if let Some(entry) = entries.get_mut(slot.slot as usize) {
                *entry = slot.message.clone();
            }
        }
        data.slots.insert(message_type, entries);
        self.save_data(&data);
    }

    pub fn cooldowns(&self) -> BTreeMap<MessageType, BTreeMap<u8, u64>> {
        self.get_data().cooldowns
    }

    /// Unlock timestamp for one slot; 0 means no cooldown recorded.
    pub fn cooldown_unlock(&self, message_type: MessageType, slot: u8) -> u64 {
        self.get_data()
            .cooldowns
            .get(&message_type)
            .and_then(|per_type| per_type.get(&slot))
            .copied()
            .unwrap_or(0)
    }

    pub fn set_cooldown(&self, message_type: MessageType, slot: u8, unlock_ms: u64) {
        let mut data = self.get_data();
        data.cooldowns
            .entry(message_type)
            .or_default()
            .insert(slot, unlock_ms);
        self.save_data(&data);
    }

    /// Reconcile a vendor-reported remaining cooldown with the stored unlock
    /// time. The stored value is only overwritten when the drift exceeds one
    /// minute, or when the local state shows no cooldown but the API reports
    /// one newly starting — otherwise a UI countdown would reset to the top
    /// of a minute on every poll from rounding alone.
    pub fn sync_cooldown(
        &self,
        message_type: MessageType,
        slot: u8,
        reported_minutes: u64,
        now_ms: u64,
    ) {
        let stored = self.cooldown_unlock(message_type, slot);
        let local_remaining_ms = stored.saturating_sub(now_ms);
        let local_minutes = local_remaining_ms as f64 / 60_000.0;
        let drift = (local_minutes - reported_minutes as f64).abs();
        let newly_starting = local_remaining_ms == 0 && reported_minutes > 0;

        if drift > 1.0 || newly_starting {
            self.set_cooldown(message_type, slot, now_ms + reported_minutes * 60_000);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn fresh_store_has_twelve_empty_slots_per_type() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        let slots = store.cached_slots();
        assert_eq!(slots.len(), 4);
        for message_type in MessageType::ALL {
            assert_eq!(slots[&message_type].len(), 12);
            assert!(slots[&message_type].iter().all(String::is_empty));
        }
    }

    #[test]
    fn corrupt_file_reads_as_defaults() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), "garbage").unwrap();
        let store = MessageSlotStore::new(dir.path());
        assert_eq!(store.cached_slots_for(MessageType::Response).len(), 12);
        assert_eq!(store.cooldown_unlock(MessageType::Response, 3), 0);
    }

    #[test]
    fn single_slot_update_persists() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        store.update_cached_slot(MessageType::Response, 4, "brb");
        let entries = store.cached_slots_for(MessageType::Response);
        assert_eq!(entries[4], "brb");
        assert!(entries[3].is_empty());
    }

    #[test]
    fn bulk_replace_overwrites_all_twelve_entries() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        store.update_cached_slot(MessageType::Response, 0, "stale");

        let fresh: Vec<SlotData> = (0..12)
            .map(|slot| SlotData {
                slot,
                message: format!("msg {slot}"),
                remaining_cooldown_minutes: 0,
            })
            .collect();
        store.replace_cached_slots(MessageType::Response, &fresh);

        let entries = store.cached_slots_for(MessageType::Response);
        assert_eq!(entries[0], "msg 0");
        assert_eq!(entries[11], "msg 11");
        // Other types are untouched.
        assert!(store.cached_slots_for(MessageType::Message)[0].is_empty());
    }

    #[test]
    fn sync_keeps_stored_value_when_drift_is_within_a_minute() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        let now = 1_700_000_000_000;
        let stored_unlock = now + 5 * 60_000;
        store.set_cooldown(MessageType::Message, 2, stored_unlock);

        store.sync_cooldown(MessageType::Message, 2, 5, now);
        assert_eq!(store.cooldown_unlock(MessageType::Message, 2), stored_unlock);
    }

    #[test]
    fn sync_overwrites_when_drift_exceeds_a_minute() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        let now = 1_700_000_000_000;
        store.set_cooldown(MessageType::Message, 2, now + 5 * 60_000);

        store.sync_cooldown(MessageType::Message, 2, 3, now);
        assert_eq!(
            store.cooldown_unlock(MessageType::Message, 2),
            now + 3 * 60_000
        );
    }

    #[test]
    fn sync_records_a_newly_starting_cooldown() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        let now = 1_700_000_000_000;

        store.sync_cooldown(MessageType::Request, 7, 1, now);
        assert_eq!(store.cooldown_unlock(MessageType::Request, 7), now + 60_000);
    }

    #[test]
    fn sync_clears_an_expired_cooldown_the_vendor_no_longer_reports() {
        let dir = tempdir().unwrap();
        let store = MessageSlotStore::new(dir.path());
        let now = 1_700_000_000_000;
        store.set_cooldown(MessageType::Message, 0, now + 10 * 60_000);

        store.sync_cooldown(MessageType::Message, 0, 0, now);
        assert_eq!(store.cooldown_unlock(MessageType::Message, 0), now);
    }
}
