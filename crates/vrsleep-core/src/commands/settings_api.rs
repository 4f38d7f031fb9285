use super::*;
use crate::store::{Settings, SettingsPatch};

impl VrSleepCore {
    pub fn settings(&self) -> Settings {
        self.settings.get()
    }

    /// Apply a partial settings update, immediately re-sync the engine's
    /// status rotation (a no-op while asleep), and broadcast the change.
    pub async fn update_settings(&self, patch: SettingsPatch) -> Settings {
        let next = self.settings.set(patch);
        self.engine.refresh_status().await;
        self.events.emit(CoreEvent::SettingsChanged(next.clone()));
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn update_merges_and_broadcasts() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();
        let mut events = core.subscribe();

        let next = core
            .update_settings(SettingsPatch {
                auto_status_enabled: Some(true),
                sleep_status: Some("busy".to_string()),
                ..SettingsPatch::default()
            })
            .await;

        assert!(next.auto_status_enabled);
        assert_eq!(next.sleep_status, "busy");
        // Fields not in the patch keep their defaults.
        assert_eq!(next.active_tab, "whitelist");
        assert_eq!(core.settings(), next);

        match events.try_recv().unwrap() {
            CoreEvent::SettingsChanged(settings) => assert_eq!(settings, next),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn previously_set_fields_survive_later_partial_updates() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        core.update_settings(SettingsPatch {
            sleep_status_description: Some("asleep, auto-accepting".to_string()),
            ..SettingsPatch::default()
        })
        .await;
        let next = core
            .update_settings(SettingsPatch {
                invite_message_enabled: Some(true),
                ..SettingsPatch::default()
            })
            .await;

        assert_eq!(next.sleep_status_description, "asleep, auto-accepting");
        assert!(next.invite_message_enabled);
    }
}
