//! Sleep-mode engine: the timer-driven state machine that polls for invite
//! requests, auto-responds to whitelisted senders, and rotates the user's
//! presence status.
//!
//! Two states: Asleep (idle, no timer) and Awake (poll task armed). Poll
//! cycles never overlap; `stop()` disarms future ticks but lets an in-flight
//! cycle finish. Every lifecycle error here is logged and swallowed — the
//! engine must never crash the host process, especially during shutdown.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::api::VrcApi;
use crate::config::MIN_POLL_MS;
use crate::events::EventBus;
use crate::session::AuthGate;
use crate::store::{normalize_entry, SettingsStore, WhitelistStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SleepStatus {
    pub sleep_mode: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct StatusSnapshot {
    status: String,
    status_description: String,
}

#[derive(Default)]
struct EngineState {
    awake: bool,
    /// Notification ids acted on this session: at most one action per id.
    handled_notifications: HashSet<String>,
    /// Sender ids invited this session: at most one invite per sender.
    handled_senders: HashSet<String>,
    /// Original status, captured once the first time this engine changes it.
    pre_sleep: Option<StatusSnapshot>,
    /// Exactly what this engine last wrote, for the stop-time safety check.
    applied: Option<StatusSnapshot>,
    poll_task: Option<JoinHandle<()>>,
}

pub struct SleepModeEngine {
    api: Arc<dyn VrcApi>,
    auth: Arc<dyn AuthGate>,
    whitelist: Arc<WhitelistStore>,
    settings: Arc<SettingsStore>,
    events: EventBus,
    poll_interval_ms: u64,
    state: Mutex<EngineState>,
    stop_signal: Notify,
}

impl SleepModeEngine {
    pub fn new(
        api: Arc<dyn VrcApi>,
        auth: Arc<dyn AuthGate>,
        whitelist: Arc<WhitelistStore>,
        settings: Arc<SettingsStore>,
        events: EventBus,
        poll_interval_ms: u64,
    ) -> Self {
        Self {
            api,
            auth,
            whitelist,
            settings,
            events,
            poll_interval_ms,
            state: Mutex::new(EngineState::default()),
            stop_signal: Notify::new(),
        }
    }

    /// Effective poll interval: the configured value is clamped up to the
    /// floor, never down.
    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(MIN_POLL_MS))
    }

    fn is_awake(&self) -> bool {
        self.state.lock().awake
    }

    pub fn status(&self) -> SleepStatus {
        SleepStatus {
            sleep_mode: self.is_awake(),
        }
    }

    /// Asleep → Awake: arm the poll timer (which fires once immediately),
    /// then attempt a status refresh.
    pub async fn start(self: Arc<Self>) -> SleepStatus {
        {
            let mut state = self.state.lock();
            if state.awake {
                return SleepStatus { sleep_mode: true };
            }
            state.awake = true;
            let engine = Arc::clone(&self);
            state.poll_task = Some(tokio::spawn(async move { engine.poll_loop().await }));
        }
        self.events.log("Sleep mode enabled.");
        self.refresh_status().await;
        SleepStatus { sleep_mode: true }
    }

    async fn poll_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.poll_interval());
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !self.is_awake() {
                        break;
                    }
                    self.check_invites().await;
                }
                _ = self.stop_signal.notified() => break,
            }
        }
    }

    /// Awake → Asleep: disarm the timer, forget this session's handled ids,
    /// and restore the pre-sleep status — unless the live status no longer
    /// matches what this engine itself last set, in which case the user took
    /// manual control and restoration is skipped.
    pub async fn stop(&self) -> SleepStatus {
        let (pre_sleep, applied) = {
            let mut state = self.state.lock();
            state.awake = false;
            // Dropping the handle detaches the task rather than aborting it:
            // an in-flight poll cycle is allowed to finish.
            drop(state.poll_task.take());
            state.handled_notifications.clear();
            state.handled_senders.clear();
            (state.pre_sleep.take(), state.applied.take())
        };
        self.stop_signal.notify_waiters();
        self.events.log("Sleep mode disabled.");

        if let Some(pre) = pre_sleep {
            if self.auth.is_ready_for_api() {
                match self.api.get_current_user().await {
                    Ok(current) => {
                        let still_ours = applied.as_ref().is_some_and(|set| {
                            current.status == set.status
                                && current.status_description == set.status_description
                        });
                        if still_ours {
                            self.events
                                .log(format!("Restoring pre-sleep status: {}", pre.status));
                            if let Err(err) = self
                                .api
                                .update_status(&current.id, &pre.status, &pre.status_description)
                                .await
                            {
                                self.events.log(format!("Failed to restore status: {err}"));
                            }
                        } else {
                            self.events
                                .log("Status was changed manually in-game. Skipping restoration.");
                        }
                    }
                    Err(err) => self.events.log(format!("Failed to restore status: {err}")),
                }
            }
        }

        SleepStatus { sleep_mode: false }
    }

    /// One poll cycle: fetch invite requests and respond to whitelisted
    /// senders. Any fetch error aborts the cycle silently; it is retried on
    /// the next tick.
    pub async fn check_invites(&self) {
        if !self.is_awake() || !self.auth.is_ready_for_api() {
            return;
        }

        let invites = match self.api.fetch_invites().await {
            Ok(invites) => invites,
            Err(err) => {
                tracing::debug!("invite fetch failed, retrying next poll: {err}");
                return;
            }
        };
        if invites.is_empty() {
            return;
        }

        let whitelist = self.whitelist.normalized();

        for invite in invites {
            let sender_norm = normalize_entry(&invite.sender_id);
            let name_norm = normalize_entry(&invite.sender_display_name);
            let display = if invite.sender_display_name.is_empty() {
                invite.sender_id.clone()
            } else {
                invite.sender_display_name.clone()
            };

            // Already invited this sender this session: keep the feed clean
            // but do not invite again, however often they re-request.
            if self.state.lock().handled_senders.contains(&invite.sender_id) {
                self.hide_notification(&invite.id).await;
                continue;
            }

            // Same notification delivered twice before the hide landed.
            if !invite.id.is_empty()
                && self.state.lock().handled_notifications.contains(&invite.id)
            {
                continue;
            }

            let matched = whitelist
                .iter()
                .any(|entry| *entry == sender_norm || *entry == name_norm);
            if !matched {
                // Unmatched requests must not accumulate in the feed.
                self.hide_notification(&invite.id).await;
                continue;
            }

            let settings = self.settings.get();
            let slot = settings
                .invite_message_enabled
                .then_some((settings.invite_message_type, settings.invite_message_slot));

            match self.api.send_invite(&invite.sender_id, None, slot).await {
                Ok(()) => {
                    {
                        let mut state = self.state.lock();
                        state.handled_senders.insert(invite.sender_id.clone());
                        if !invite.id.is_empty() {
                            state.handled_notifications.insert(invite.id.clone());
                        }
                    }
                    self.events.log(format!("Sent invite to {display}"));
                    self.hide_notification(&invite.id).await;
                }
                Err(err) => {
                    self.events
                        .log(format!("Failed to send invite to {display}: {err}"));
                    // Hide anyway so the same notification cannot error-loop
                    // on every poll.
                    self.hide_notification(&invite.id).await;
                }
            }
        }
    }

    /// Synchronize the live status with the sleep-mode settings. Invoked at
    /// `start()` and whenever settings change while Awake.
    pub async fn refresh_status(&self) {
        if !self.is_awake() || !self.auth.is_ready_for_api() {
            return;
        }

        let settings = self.settings.get();
        let has_override = settings.has_status_override();
        let configured_description = settings.sleep_status_description.trim().to_string();

        if settings.auto_status_enabled && (has_override || !configured_description.is_empty()) {
            let user = match self.api.get_current_user().await {
                Ok(user) => user,
                Err(err) => {
                    self.events.log(format!("Failed to update status: {err}"));
                    return;
                }
            };

            // Snapshot the original status exactly once, before the first
            // write; never overwritten while the engine stays active.
            let pre_sleep = {
                let mut state = self.state.lock();
                if state.pre_sleep.is_none() {
                    state.pre_sleep = Some(StatusSnapshot {
                        status: user.status.clone(),
                        status_description: user.status_description.clone(),
                    });
                }
                state.pre_sleep.clone().unwrap()
            };

            let target_status = if has_override {
                settings.sleep_status.clone()
            } else {
                pre_sleep.status.clone()
            };
            let target_description = if configured_description.is_empty() {
                pre_sleep.status_description.clone()
            } else {
                configured_description
            };

            // Skip the remote write entirely when nothing would change.
            if user.status == target_status && user.status_description == target_description {
                return;
            }

            match self
                .api
                .update_status(&user.id, &target_status, &target_description)
                .await
            {
                Ok(updated) => {
                    let label = if updated.status_description.is_empty() {
                        "no message".to_string()
                    } else {
                        updated.status_description.clone()
                    };
                    self.events
                        .log(format!("Status updated to: {} ({label})", updated.status));
                    self.state.lock().applied = Some(StatusSnapshot {
                        status: updated.status,
                        status_description: updated.status_description,
                    });
                }
                Err(err) => self.events.log(format!("Failed to update status: {err}")),
            }
        } else {
            // Feature turned off mid-session: put the original status back
            // right away, distinct from the stop()-time restoration.
            let pre_sleep = self.state.lock().pre_sleep.clone();
            if let Some(pre) = pre_sleep {
                match self.api.get_current_user().await {
                    Ok(user) => {
                        self.events
                            .log("Custom status cleared. Restoring pre-sleep status.");
                        match self
                            .api
                            .update_status(&user.id, &pre.status, &pre.status_description)
                            .await
                        {
                            Ok(_) => {
                                let mut state = self.state.lock();
                                state.pre_sleep = None;
                                state.applied = None;
                            }
                            Err(err) => {
                                self.events.log(format!("Failed to restore status: {err}"))
                            }
                        }
                    }
                    Err(err) => self.events.log(format!("Failed to restore status: {err}")),
                }
            }
        }
    }

    /// Best-effort cleanup; failures here are never critical path.
    async fn hide_notification(&self, notification_id: &str) {
        if notification_id.is_empty() {
            return;
        }
        if let Err(err) = self.api.delete_notification(notification_id).await {
            tracing::debug!("notification hide failed: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::{
        Friend, InviteNotification, MessageType, SlotData, SlotUpdate, UserProfile,
    };
    use crate::error::{CoreError, Result};
    use crate::store::SettingsPatch;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tempfile::{tempdir, TempDir};

    struct MockGate {
        ready: AtomicBool,
    }

    impl AuthGate for MockGate {
        fn is_ready_for_api(&self) -> bool {
            self.ready.load(Ordering::SeqCst)
        }
    }

    #[derive(Default)]
    struct MockApi {
        invite_queue: Mutex<VecDeque<Vec<InviteNotification>>>,
        fetch_count: AtomicUsize,
        fail_send: AtomicBool,
        sent: Mutex<Vec<(String, Option<(MessageType, u8)>)>>,
        hidden: Mutex<Vec<String>>,
        user: Mutex<UserProfile>,
        status_updates: Mutex<Vec<(String, String, String)>>,
    }

    impl MockApi {
        fn queue_invites(&self, invites: Vec<InviteNotification>) {
            self.invite_queue.lock().push_back(invites);
        }

        fn set_live_status(&self, status: &str, description: &str) {
            let mut user = self.user.lock();
            user.status = status.to_string();
            user.status_description = description.to_string();
        }
    }

    #[async_trait]
    impl VrcApi for MockApi {
        async fn fetch_invites(&self) -> Result<Vec<InviteNotification>> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.invite_queue.lock().pop_front().unwrap_or_default())
        }

        async fn send_invite(
            &self,
            user_id: &str,
            _message: Option<&str>,
            slot: Option<(MessageType, u8)>,
        ) -> Result<()> {
            if self.fail_send.load(Ordering::SeqCst) {
                return Err(CoreError::NoJoinableLocation);
            }
            self.sent.lock().push((user_id.to_string(), slot));
            Ok(())
        }

        async fn delete_notification(&self, notification_id: &str) -> Result<()> {
            self.hidden.lock().push(notification_id.to_string());
            Ok(())
        }

        async fn get_friends(&self) -> Result<Vec<Friend>> {
            unreachable!("not used by the engine")
        }

        async fn get_current_user(&self) -> Result<UserProfile> {
            Ok(self.user.lock().clone())
        }

        async fn update_status(
            &self,
            user_id: &str,
            status: &str,
            status_description: &str,
        ) -> Result<UserProfile> {
            self.status_updates.lock().push((
                user_id.to_string(),
                status.to_string(),
                status_description.to_string(),
            ));
            self.set_live_status(status, status_description);
            Ok(self.user.lock().clone())
        }

        async fn get_message_slot(&self, _: &str, _: MessageType, _: u8) -> Result<SlotData> {
            unreachable!("not used by the engine")
        }

        async fn get_message_slots(&self, _: &str, _: MessageType) -> Result<Vec<SlotData>> {
            unreachable!("not used by the engine")
        }

        async fn update_message_slot(
            &self,
            _: &str,
            _: MessageType,
            _: u8,
            _: &str,
        ) -> Result<SlotUpdate> {
            unreachable!("not used by the engine")
        }
    }

    struct Harness {
        engine: Arc<SleepModeEngine>,
        api: Arc<MockApi>,
        settings: Arc<SettingsStore>,
        _dir: TempDir,
    }

    fn harness(whitelist: &[&str]) -> Harness {
        let dir = tempdir().unwrap();
        let api = Arc::new(MockApi {
            user: Mutex::new(UserProfile {
                id: "usr_me".to_string(),
                status: "active".to_string(),
                status_description: "hello".to_string(),
                ..UserProfile::default()
            }),
            ..MockApi::default()
        });
        let gate = Arc::new(MockGate {
            ready: AtomicBool::new(true),
        });
        let whitelist_store = Arc::new(WhitelistStore::new(dir.path()));
        whitelist_store.set(whitelist.iter().map(|s| s.to_string()).collect());
        let settings = Arc::new(SettingsStore::new(dir.path()));
        let engine = Arc::new(SleepModeEngine::new(
            api.clone(),
            gate,
            whitelist_store,
            settings.clone(),
            EventBus::new(),
            15_000,
        ));
        Harness {
            engine,
            api,
            settings,
            _dir: dir,
        }
    }

    fn wake(engine: &SleepModeEngine) {
        engine.state.lock().awake = true;
    }

    fn invite(id: &str, sender_id: &str, name: &str) -> InviteNotification {
        InviteNotification {
            id: id.to_string(),
            sender_id: sender_id.to_string(),
            sender_display_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn whitelisted_display_name_triggers_one_invite_and_one_hide() {
        let h = harness(&["Alice"]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);

        h.engine.check_invites().await;

        let sent = h.api.sent.lock().clone();
        assert_eq!(sent, vec![("usr_123".to_string(), None)]);
        assert_eq!(h.api.hidden.lock().clone(), vec!["not_1".to_string()]);
    }

    #[tokio::test]
    async fn repeat_requests_from_a_handled_sender_are_hidden_not_reinvited() {
        let h = harness(&["alice"]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);
        h.engine.check_invites().await;

        // Same sender spams a fresh request in the same awake session.
        h.api
            .queue_invites(vec![invite("not_2", "usr_123", "Alice")]);
        h.engine.check_invites().await;

        assert_eq!(h.api.sent.lock().len(), 1);
        assert_eq!(
            h.api.hidden.lock().clone(),
            vec!["not_1".to_string(), "not_2".to_string()]
        );
    }

    #[tokio::test]
    async fn a_handled_notification_id_is_skipped_without_reprocessing() {
        let h = harness(&["Alice", "Bob"]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_1", "usr_a", "Alice")]);
        h.engine.check_invites().await;

        // The same notification id comes back attributed to a different
        // sender; the id was already acted on, so nothing happens.
        h.api.queue_invites(vec![invite("not_1", "usr_b", "Bob")]);
        h.engine.check_invites().await;

        assert_eq!(h.api.sent.lock().len(), 1);
        assert_eq!(h.api.hidden.lock().len(), 1);
    }

    #[tokio::test]
    async fn unmatched_senders_are_hidden_without_invites() {
        let h = harness(&["Alice"]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_9", "usr_999", "Mallory")]);

        h.engine.check_invites().await;

        assert!(h.api.sent.lock().is_empty());
        assert_eq!(h.api.hidden.lock().clone(), vec!["not_9".to_string()]);
    }

    #[tokio::test]
    async fn matching_is_case_insensitive_and_trimmed() {
        let h = harness(&["  aLiCe  "]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "ALICE")]);

        h.engine.check_invites().await;

        assert_eq!(h.api.sent.lock().len(), 1);
    }

    #[tokio::test]
    async fn failed_send_hides_the_notification_and_leaves_sender_unhandled() {
        let h = harness(&["Alice"]);
        wake(&h.engine);
        h.api.fail_send.store(true, Ordering::SeqCst);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);

        h.engine.check_invites().await;

        assert!(h.api.sent.lock().is_empty());
        assert_eq!(h.api.hidden.lock().clone(), vec!["not_1".to_string()]);
        assert!(h.engine.state.lock().handled_senders.is_empty());
    }

    #[tokio::test]
    async fn stop_then_start_allows_the_same_sender_again() {
        let h = harness(&["Alice"]);
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);
        h.engine.check_invites().await;
        assert_eq!(h.api.sent.lock().len(), 1);

        h.engine.stop().await;
        wake(&h.engine);
        h.api
            .queue_invites(vec![invite("not_2", "usr_123", "Alice")]);
        h.engine.check_invites().await;

        assert_eq!(h.api.sent.lock().len(), 2);
    }

    #[tokio::test]
    async fn configured_message_slot_rides_along_when_enabled() {
        let h = harness(&["Alice"]);
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            invite_message_enabled: Some(true),
            invite_message_slot: Some(4),
            invite_message_type: Some(MessageType::Response),
            ..SettingsPatch::default()
        });
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);

        h.engine.check_invites().await;

        assert_eq!(
            h.api.sent.lock().clone(),
            vec![("usr_123".to_string(), Some((MessageType::Response, 4)))]
        );
    }

    #[tokio::test]
    async fn poll_is_a_noop_when_asleep() {
        let h = harness(&["Alice"]);
        h.api
            .queue_invites(vec![invite("not_1", "usr_123", "Alice")]);

        h.engine.check_invites().await;

        assert_eq!(h.api.fetch_count.load(Ordering::SeqCst), 0);
        assert!(h.api.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn status_refresh_skips_the_write_when_already_on_target() {
        let h = harness(&[]);
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(true),
            sleep_status: Some("busy".to_string()),
            sleep_status_description: Some("sleeping".to_string()),
            ..SettingsPatch::default()
        });
        h.api.set_live_status("busy", "sleeping");

        h.engine.refresh_status().await;

        assert!(h.api.status_updates.lock().is_empty());
        // The snapshot was still captured for later restoration.
        assert!(h.engine.state.lock().pre_sleep.is_some());
    }

    #[tokio::test]
    async fn status_refresh_writes_once_and_snapshots_the_original() {
        let h = harness(&[]);
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(true),
            sleep_status: Some("busy".to_string()),
            sleep_status_description: Some("sleeping".to_string()),
            ..SettingsPatch::default()
        });

        h.engine.refresh_status().await;
        h.engine.refresh_status().await;

        assert_eq!(
            h.api.status_updates.lock().clone(),
            vec![(
                "usr_me".to_string(),
                "busy".to_string(),
                "sleeping".to_string()
            )]
        );
        let snapshot = h.engine.state.lock().pre_sleep.clone().unwrap();
        assert_eq!(snapshot.status, "active");
        assert_eq!(snapshot.status_description, "hello");
    }

    #[tokio::test]
    async fn stop_restores_the_pre_sleep_status_when_untouched() {
        let h = harness(&[]);
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(true),
            sleep_status: Some("busy".to_string()),
            sleep_status_description: Some("sleeping".to_string()),
            ..SettingsPatch::default()
        });
        h.engine.refresh_status().await;

        h.engine.stop().await;

        let updates = h.api.status_updates.lock().clone();
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[1],
            (
                "usr_me".to_string(),
                "active".to_string(),
                "hello".to_string()
            )
        );
    }

    #[tokio::test]
    async fn stop_skips_restoration_after_a_manual_override() {
        let h = harness(&[]);
        let mut events = h.engine.events.subscribe();
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(true),
            sleep_status: Some("busy".to_string()),
            sleep_status_description: Some("sleeping".to_string()),
            ..SettingsPatch::default()
        });
        h.engine.refresh_status().await;

        // The user changes their status in-game behind the engine's back.
        h.api.set_live_status("join me", "party time");
        h.engine.stop().await;

        let updates = h.api.status_updates.lock().clone();
        assert_eq!(updates.len(), 1, "no restoration write expected");

        let mut saw_skip = false;
        while let Ok(event) = events.try_recv() {
            if let crate::events::CoreEvent::Log { message, .. } = event {
                if message.contains("Skipping restoration") {
                    saw_skip = true;
                }
            }
        }
        assert!(saw_skip, "manual-override skip should be logged");
    }

    #[tokio::test]
    async fn disabling_the_feature_mid_session_restores_immediately() {
        let h = harness(&[]);
        wake(&h.engine);
        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(true),
            sleep_status: Some("busy".to_string()),
            sleep_status_description: Some("sleeping".to_string()),
            ..SettingsPatch::default()
        });
        h.engine.refresh_status().await;

        h.settings.set(SettingsPatch {
            auto_status_enabled: Some(false),
            ..SettingsPatch::default()
        });
        h.engine.refresh_status().await;

        let updates = h.api.status_updates.lock().clone();
        assert_eq!(updates.len(), 2);
        assert_eq!(
            updates[1],
            (
                "usr_me".to_string(),
                "active".to_string(),
                "hello".to_string()
            )
        );
        assert!(h.engine.state.lock().pre_sleep.is_none());
    }

    #[tokio::test]
    async fn start_and_stop_round_trip() {
        let h = harness(&[]);
        assert!(!h.engine.status().sleep_mode);

        let started = h.engine.clone().start().await;
        assert!(started.sleep_mode);
        assert!(h.engine.status().sleep_mode);

        let stopped = h.engine.stop().await;
        assert!(!stopped.sleep_mode);
        assert!(!h.engine.status().sleep_mode);
    }

    #[test]
    fn poll_interval_is_clamped_up_never_down() {
        let h = harness(&[]);
        assert_eq!(h.engine.poll_interval(), Duration::from_millis(15_000));

        let dir = tempdir().unwrap();
        let engine = SleepModeEngine::new(
            h.api.clone(),
            Arc::new(MockGate {
                ready: AtomicBool::new(true),
            }),
            Arc::new(WhitelistStore::new(dir.path())),
            Arc::new(SettingsStore::new(dir.path())),
            EventBus::new(),
            5_000,
        );
        assert_eq!(engine.poll_interval(), Duration::from_millis(10_000));
    }
}
