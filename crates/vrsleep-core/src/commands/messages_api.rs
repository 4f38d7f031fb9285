use std::collections::BTreeMap;

use super::*;
use crate::api::types::{MessageType, SlotData, SlotUpdate, SLOT_COUNT};
use crate::api::VrcApi;

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

impl VrSleepCore {
    /// Fetch one message slot, refreshing the local cache and cooldown.
    pub async fn message_slot(&self, message_type: MessageType, slot: u8) -> Result<SlotData> {
        check_slot(slot)?;
        let user_id = self.require_user_id()?;
        let data = self.api.get_message_slot(&user_id, message_type, slot).await?;

        self.message_slots
            .update_cached_slot(message_type, slot, &data.message);
        self.message_slots.sync_cooldown(
            message_type,
            slot,
            data.remaining_cooldown_minutes,
            now_ms(),
        );
        Ok(data)
    }

    /// Fetch all 12 slots for a type, treating the result as the
    /// authoritative cache state for that type.
    pub async fn all_message_slots(&self, message_type: MessageType) -> Result<Vec<SlotData>> {
        let user_id = self.require_user_id()?;
        let slots = self.api.get_message_slots(&user_id, message_type).await?;

        self.message_slots.replace_cached_slots(message_type, &slots);
        let now = now_ms();
        for slot in &slots {
            self.message_slots.sync_cooldown(
                message_type,
                slot.slot,
                slot.remaining_cooldown_minutes,
                now,
            );
        }
        Ok(slots)
    }

    /// Push a new template into a slot. When the vendor answers with the full
    /// 12-slot state, all cached entries for the type are overwritten from
    /// it, not just the updated index.
    pub async fn apply_message_slot(
        &self,
        message_type: MessageType,
        slot: u8,
        message: &str,
    ) -> Result<SlotUpdate> {
        check_slot(slot)?;
        let user_id = self.require_user_id()?;
        let update = self
            .api
            .update_message_slot(&user_id, message_type, slot, message)
            .await?;

        let now = now_ms();
        match &update {
            SlotUpdate::Bulk(slots) => {
                self.message_slots.replace_cached_slots(message_type, slots);
                for entry in slots {
                    self.message_slots.sync_cooldown(
                        message_type,
                        entry.slot,
                        entry.remaining_cooldown_minutes,
                        now,
                    );
                }
            }
            SlotUpdate::Single(entry) => {
                self.message_slots
                    .update_cached_slot(message_type, slot, &entry.message);
                self.message_slots.sync_cooldown(
                    message_type,
                    slot,
                    entry.remaining_cooldown_minutes,
                    now,
                );
            }
        }
        Ok(update)
    }

    /// Last-known slot texts from the local cache, keyed by type.
    pub fn cached_message_slots(&self) -> BTreeMap<MessageType, Vec<String>> {
        self.message_slots.cached_slots()
    }

    /// Per-slot cooldown unlock timestamps (epoch ms).
    pub fn message_cooldowns(&self) -> BTreeMap<MessageType, BTreeMap<u8, u64>> {
        self.message_slots.cooldowns()
    }
}

fn check_slot(slot: u8) -> Result<()> {
    if slot >= SLOT_COUNT {
        return Err(CoreError::InvalidInput {
            message: format!("Slot index out of range: {slot}"),
        });
    }
    Ok(())
}
