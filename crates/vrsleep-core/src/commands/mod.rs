//! Command surface exposed by the core to its UI collaborator.
//!
//! One struct, [`VrSleepCore`], wires config → stores → auth → API client →
//! engine; its operations are split across per-domain `*_api.rs` modules.
//! All operations are request/response and safe to interleave with the
//! engine's poll task.

mod auth_api;
mod friends_api;
mod messages_api;
mod settings_api;
mod sleep_api;
mod whitelist_api;

use std::sync::Arc;

use crate::api::{build_http_client, VrcApiClient};
use crate::config::CoreConfig;
use crate::engine::SleepModeEngine;
use crate::error::{CoreError, Result};
use crate::events::{CoreEvent, EventBus};
use crate::session::AuthManager;
use crate::store::{MessageSlotStore, SettingsStore, WhitelistStore};

pub struct VrSleepCore {
    config: Arc<CoreConfig>,
    auth: Arc<AuthManager>,
    api: Arc<VrcApiClient>,
    engine: Arc<SleepModeEngine>,
    whitelist: Arc<WhitelistStore>,
    settings: Arc<SettingsStore>,
    message_slots: Arc<MessageSlotStore>,
    events: EventBus,
}

impl VrSleepCore {
    pub fn new(config: CoreConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir).map_err(CoreError::storage)?;
        let config = Arc::new(config);

        let http = build_http_client()?;
        let auth = Arc::new(AuthManager::new(config.clone(), http.clone()));
        let api = Arc::new(VrcApiClient::new(config.clone(), auth.clone(), http));

        let whitelist = Arc::new(WhitelistStore::new(&config.data_dir));
        let settings = Arc::new(SettingsStore::new(&config.data_dir));
        let message_slots = Arc::new(MessageSlotStore::new(&config.data_dir));

        let events = EventBus::new();
        let engine = Arc::new(SleepModeEngine::new(
            api.clone(),
            auth.clone(),
            whitelist.clone(),
            settings.clone(),
            events.clone(),
            config.poll_interval_ms,
        ));

        Ok(Self {
            config,
            auth,
            api,
            engine,
            whitelist,
            settings,
            message_slots,
            events,
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// Subscribe to the activity-log / settings-changed stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    /// User id of the authenticated session, or an error when there is none.
    fn require_user_id(&self) -> Result<String> {
        let status = self.auth.auth_status();
        if !status.authenticated {
            return Err(CoreError::NotAuthenticated);
        }
        status.user_id.ok_or(CoreError::NotAuthenticated)
    }
}
