use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Number of addressable slots per message type.
pub const SLOT_COUNT: u8 = 12;

/// The four VRChat message template types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageType {
    Message,
    Response,
    Request,
    RequestResponse,
}

impl MessageType {
    pub const ALL: [MessageType; 4] = [
        MessageType::Message,
        MessageType::Response,
        MessageType::Request,
        MessageType::RequestResponse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Message => "message",
            MessageType::Response => "response",
            MessageType::Request => "request",
            MessageType::RequestResponse => "requestResponse",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(MessageType::Message),
            "response" => Ok(MessageType::Response),
            "request" => Ok(MessageType::Request),
            "requestResponse" => Ok(MessageType::RequestResponse),
            other => Err(format!("unknown message type: {other}")),
        }
    }
}

/// Live presence block on the user profile; world + instance form a joinable
/// location when both are present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Presence {
    pub world: String,
    pub instance: String,
}

/// The caller's own profile as returned by `/auth/user`, reduced to the
/// fields this app consumes. Unknown fields are dropped on deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub status: String,
    pub status_description: String,
    pub location: String,
    pub presence: Option<Presence>,
    pub current_avatar_thumbnail_image_url: String,
    pub profile_pic_override: String,
    /// Non-empty when the vendor demands a second factor to finish login.
    pub requires_two_factor_auth: Vec<String>,
}

/// Slim friend projection handed to the UI collaborator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub display_name: String,
    pub username: String,
    pub status: String,
    pub status_description: String,
    pub thumbnail_url: String,
}

impl Friend {
    pub fn from_profile(profile: UserProfile) -> Self {
        let status = if profile.status.is_empty() {
            "offline".to_string()
        } else {
            profile.status
        };
        let thumbnail_url = if !profile.current_avatar_thumbnail_image_url.is_empty() {
            profile.current_avatar_thumbnail_image_url
        } else {
            profile.profile_pic_override
        };
        Self {
            id: profile.id,
            display_name: profile.display_name,
            username: profile.username,
            status,
            status_description: profile.status_description,
            thumbnail_url,
        }
    }
}

/// An incoming "please invite me" notification, projected from the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteNotification {
    pub id: String,
    pub sender_id: String,
    pub sender_display_name: String,
}

impl InviteNotification {
    /// Project a raw notification feed entry. Returns `None` for anything
    /// that is not an invite request with a sender id; malformed entries are
    /// dropped, not errored.
    pub fn from_feed_item(item: &Value) -> Option<Self> {
        if item.get("type").and_then(Value::as_str) != Some("requestInvite") {
            return None;
        }
        let sender_id = first_string(item, &["senderUserId", "senderId", "userId"])?;
        let id = first_string(item, &["id", "_id"]).unwrap_or_default();
        let sender_display_name =
            first_string(item, &["senderDisplayName", "senderUsername", "displayName"])
                .unwrap_or_default();
        Some(Self {
            id,
            sender_id,
            sender_display_name,
        })
    }
}

fn first_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// One message slot, normalized from whatever shape the vendor returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlotData {
    pub slot: u8,
    pub message: String,
    pub remaining_cooldown_minutes: u64,
}

impl SlotData {
    pub fn empty(slot: u8) -> Self {
        Self {
            slot,
            message: String::new(),
            remaining_cooldown_minutes: 0,
        }
    }
}

/// Result of a slot update: the vendor sometimes answers with the single
/// updated slot and sometimes with the full 12-slot state for that type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SlotUpdate {
    Bulk(Vec<SlotData>),
    Single(SlotData),
}

/// Normalize a single-slot response. The vendor may answer with a bare
/// string, an object, or the full array for the type; all three collapse to
/// one [`SlotData`] here so shape ambiguity never leaks past this boundary.
pub fn normalize_slot_response(slot: u8, value: &Value) -> SlotData {
    match value {
        Value::Array(entries) => entries
            .get(slot as usize)
            .map(|entry| normalize_slot_entry(slot, entry))
            .unwrap_or_else(|| SlotData::empty(slot)),
        other => normalize_slot_entry(slot, other),
    }
}

/// Detect an array-shaped (bulk) response and normalize every element.
/// Returns `None` when the response is not an array.
pub fn normalize_bulk_response(value: &Value) -> Option<Vec<SlotData>> {
    let entries = value.as_array()?;
    Some(
        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let slot = entry
                    .get("slot")
                    .and_then(Value::as_u64)
                    .map(|s| s as u8)
                    .unwrap_or(index as u8);
                normalize_slot_entry(slot, entry)
            })
            .collect(),
    )
}

fn normalize_slot_entry(slot: u8, value: &Value) -> SlotData {
    match value {
        Value::String(message) => SlotData {
            slot,
            message: message.clone(),
            remaining_cooldown_minutes: 0,
        },
        Value::Object(_) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string();
            let remaining_cooldown_minutes = value
                .get("remainingCooldownMinutes")
                .and_then(Value::as_f64)
                .map(|minutes| minutes.max(0.0) as u64)
                .unwrap_or(0);
            SlotData {
                slot,
                message,
                remaining_cooldown_minutes,
            }
        }
        _ => SlotData::empty(slot),
    }
}
