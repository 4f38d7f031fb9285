//! Stateless request builders and parsers for the VRChat REST endpoints this
//! app consumes. Auth headers come from the session manager; every call has a
//! hard timeout and all vendor shape ambiguity is normalized in [`types`]
//! before it can leak further up.

pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;

use crate::config::CoreConfig;
use crate::error::{CoreError, Result};
use crate::session::AuthManager;

use types::{
    normalize_bulk_response, normalize_slot_response, Friend, InviteNotification, MessageType,
    SlotData, SlotUpdate, UserProfile, SLOT_COUNT,
};

const API_BASE: &str = "https://api.vrchat.cloud/api/1";

/// Hard timeout for every outbound request; a stuck call is bounded, never
/// infinite.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Friends are paginated in pages of this size until a short page comes back.
const FRIENDS_PAGE_SIZE: usize = 100;

/// Message slots are fetched in batches this small, with a pause between
/// batches, to stay under the vendor's rate limit.
const SLOT_FETCH_BATCH: usize = 3;
const SLOT_FETCH_PAUSE: Duration = Duration::from_millis(200);

pub(crate) fn build_http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|err| CoreError::Internal {
            message: format!("failed to build HTTP client: {err}"),
        })
}

pub(crate) fn build_url(config: &CoreConfig, path: &str) -> String {
    match &config.api_key {
        None => format!("{API_BASE}{path}"),
        Some(key) => {
            let joiner = if path.contains('?') { '&' } else { '?' };
            format!("{API_BASE}{path}{joiner}apiKey={}", urlencoding::encode(key))
        }
    }
}

/// Send a request and parse the JSON body. Non-2xx responses become
/// [`CoreError::Api`] with the message extracted from the vendor error body;
/// network-level failures become [`CoreError::Connectivity`].
pub(crate) async fn send_json(request: reqwest::RequestBuilder) -> Result<(HeaderMap, Value)> {
    let response = request.send().await?;
    let status = response.status();
    let headers = response.headers().clone();
    let text = response.text().await?;

    let json: Value = if text.is_empty() {
        Value::Null
    } else {
        match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) if !status.is_success() => Value::Null,
            Err(err) => {
                return Err(CoreError::Internal {
                    message: format!("invalid JSON from API: {err}"),
                })
            }
        }
    };

    if !status.is_success() {
        return Err(CoreError::Api {
            status: status.as_u16(),
            message: extract_error_message(status.as_u16(), &json),
        });
    }

    Ok((headers, json))
}

fn extract_error_message(status: u16, json: &Value) -> String {
    json.pointer("/error/message")
        .and_then(Value::as_str)
        .or_else(|| json.get("message").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Resolve the caller's own joinable location for an invite payload: a live
/// presence world+instance pair first, then an instance string carrying the
/// private-instance marker, then the plain location field.
fn resolve_invite_location(user: &UserProfile) -> Result<String> {
    if let Some(presence) = &user.presence {
        if !presence.world.is_empty() && !presence.instance.is_empty() {
            return Ok(format!("{}:{}", presence.world, presence.instance));
        }
        if presence.instance.contains('~') {
            return Ok(presence.instance.clone());
        }
    }
    if !user.location.is_empty() && user.location != "offline" {
        return Ok(user.location.clone());
    }
    Err(CoreError::NoJoinableLocation)
}

/// The API surface the auto-responder engine drives. Implemented by
/// [`VrcApiClient`] for the real vendor and by scripted doubles in tests.
#[async_trait]
pub trait VrcApi: Send + Sync {
    /// Most recent invite-request notifications, newest page only.
    async fn fetch_invites(&self) -> Result<Vec<InviteNotification>>;

    /// Invite `user_id` to the caller's current instance, attaching either a
    /// freeform message or a message-slot reference, never both. A trimmed,
    /// non-empty freeform message takes priority.
    async fn send_invite(
        &self,
        user_id: &str,
        message: Option<&str>,
        slot: Option<(MessageType, u8)>,
    ) -> Result<()>;

    /// Hide a notification. Callers treat failures as best-effort cleanup.
    async fn delete_notification(&self, notification_id: &str) -> Result<()>;

    async fn get_friends(&self) -> Result<Vec<Friend>>;

    async fn get_current_user(&self) -> Result<UserProfile>;

    async fn update_status(
        &self,
        user_id: &str,
        status: &str,
        status_description: &str,
    ) -> Result<UserProfile>;

    async fn get_message_slot(
        &self,
        user_id: &str,
        message_type: MessageType,
        slot: u8,
    ) -> Result<SlotData>;

    async fn get_message_slots(
        &self,
        user_id: &str,
        message_type: MessageType,
    ) -> Result<Vec<SlotData>>;

    async fn update_message_slot(
        &self,
        user_id: &str,
        message_type: MessageType,
        slot: u8,
        message: &str,
    ) -> Result<SlotUpdate>;
}

/// Concrete client against the vendor REST API.
pub struct VrcApiClient {
    http: reqwest::Client,
    config: Arc<CoreConfig>,
    auth: Arc<AuthManager>,
}

impl VrcApiClient {
    pub fn new(config: Arc<CoreConfig>, auth: Arc<AuthManager>, http: reqwest::Client) -> Self {
        Self { http, config, auth }
    }

    fn headers(&self) -> Result<HeaderMap> {
        self.auth.auth_headers().ok_or(CoreError::NotAuthenticated)
    }

    fn url(&self, path: &str) -> String {
        build_url(&self.config, path)
    }

    async fn get_json(&self, path: &str) -> Result<Value> {
        let request = self.http.get(self.url(path)).headers(self.headers()?);
        let (_, json) = send_json(request).await?;
        Ok(json)
    }
}

#[async_trait]
impl VrcApi for VrcApiClient {
    async fn fetch_invites(&self) -> Result<Vec<InviteNotification>> {
        let json = self
            .get_json("/auth/user/notifications?n=50&offset=0")
            .await?;
        let Some(entries) = json.as_array() else {
            return Ok(Vec::new());
        };
        Ok(entries
            .iter()
            .filter_map(InviteNotification::from_feed_item)
            .collect())
    }

    async fn send_invite(
        &self,
        user_id: &str,
        message: Option<&str>,
        slot: Option<(MessageType, u8)>,
    ) -> Result<()> {
        if user_id.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Missing user id".to_string(),
            });
        }

        // The invite payload must reference the caller's own joinable
        // location, not the target's.
        let user = self.get_current_user().await?;
        let location = resolve_invite_location(&user)?;

        let mut body = serde_json::json!({ "instanceId": location });
        let trimmed = message.map(str::trim).filter(|m| !m.is_empty());
        if let Some(text) = trimmed {
            body["message"] = Value::from(text);
        } else if let Some((message_type, slot)) = slot {
            body["messageSlot"] = Value::from(slot);
            body["messageType"] = Value::from(message_type.as_str());
        }

        let path = format!("/invite/{}", urlencoding::encode(user_id));
        let request = self
            .http
            .post(self.url(&path))
            .headers(self.headers()?)
            .json(&body);
        send_json(request).await?;
        Ok(())
    }

    async fn delete_notification(&self, notification_id: &str) -> Result<()> {
        if notification_id.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Missing notification id".to_string(),
            });
        }
        let path = format!(
            "/auth/user/notifications/{}/hide",
            urlencoding::encode(notification_id)
        );
        let request = self.http.put(self.url(&path)).headers(self.headers()?);
        send_json(request).await?;
        Ok(())
    }

    async fn get_friends(&self) -> Result<Vec<Friend>> {
        let mut friends = Vec::new();
        let mut offset = 0;

        loop {
            let path = format!("/auth/user/friends?n={FRIENDS_PAGE_SIZE}&offset={offset}");
            let json = self.get_json(&path).await?;
            let page: Vec<UserProfile> = match serde_json::from_value(json) {
                Ok(page) => page,
                Err(_) => break,
            };
            let page_len = page.len();
            friends.extend(page.into_iter().map(Friend::from_profile));
            if page_len < FRIENDS_PAGE_SIZE {
                break;
            }
            offset += FRIENDS_PAGE_SIZE;
        }

        Ok(friends)
    }

    async fn get_current_user(&self) -> Result<UserProfile> {
        let json = self.get_json("/auth/user").await?;
        serde_json::from_value(json).map_err(|err| CoreError::Internal {
            message: format!("unexpected profile payload: {err}"),
        })
    }

    async fn update_status(
        &self,
        user_id: &str,
        status: &str,
        status_description: &str,
    ) -> Result<UserProfile> {
        if user_id.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Missing user id".to_string(),
            });
        }
        let path = format!("/users/{}", urlencoding::encode(user_id));
        let request = self
            .http
            .put(self.url(&path))
            .headers(self.headers()?)
            .json(&serde_json::json!({
                "status": status,
                "statusDescription": status_description,
            }));
        let (_, json) = send_json(request).await?;
        serde_json::from_value(json).map_err(|err| CoreError::Internal {
            message: format!("unexpected profile payload: {err}"),
        })
    }

    async fn get_message_slot(
        &self,
        user_id: &str,
        message_type: MessageType,
        slot: u8,
    ) -> Result<SlotData> {
        let path = format!(
            "/message/{}/{}/{slot}",
            urlencoding::encode(user_id),
            message_type
        );
        let json = self.get_json(&path).await?;
        Ok(normalize_slot_response(slot, &json))
    }

    async fn get_message_slots(
        &self,
        user_id: &str,
        message_type: MessageType,
    ) -> Result<Vec<SlotData>> {
        let mut slots = Vec::with_capacity(SLOT_COUNT as usize);
        let indices: Vec<u8> = (0..SLOT_COUNT).collect();

        for (batch_index, batch) in indices.chunks(SLOT_FETCH_BATCH).enumerate() {
            if batch_index > 0 {
                tokio::time::sleep(SLOT_FETCH_PAUSE).await;
            }
            let fetches = batch.iter().map(|&slot| async move {
                // A single failed slot degrades to an empty placeholder
                // instead of aborting the batch.
                self.get_message_slot(user_id, message_type, slot)
                    .await
                    .unwrap_or_else(|_| SlotData::empty(slot))
            });
            slots.extend(futures::future::join_all(fetches).await);
        }

        slots.sort_by_key(|slot| slot.slot);
        Ok(slots)
    }

    async fn update_message_slot(
        &self,
        user_id: &str,
        message_type: MessageType,
        slot: u8,
        message: &str,
    ) -> Result<SlotUpdate> {
        let path = format!(
            "/message/{}/{}/{slot}",
            urlencoding::encode(user_id),
            message_type
        );
        let request = self
            .http
            .put(self.url(&path))
            .headers(self.headers()?)
            .json(&serde_json::json!({ "message": message }));
        let (_, json) = send_json(request).await?;

        // An array-shaped response is the authoritative state of all 12
        // slots for this type, not a single-slot ack.
        if let Some(bulk) = normalize_bulk_response(&json) {
            return Ok(SlotUpdate::Bulk(bulk));
        }
        Ok(SlotUpdate::Single(normalize_slot_response(slot, &json)))
    }
}
