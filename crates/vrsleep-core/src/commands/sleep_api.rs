use super::*;
use crate::engine::SleepStatus;

impl VrSleepCore {
    /// Enter sleep mode: arm the poll timer and refresh the status.
    pub async fn sleep_start(&self) -> SleepStatus {
        self.engine.clone().start().await
    }

    /// Leave sleep mode: disarm the timer and restore the pre-sleep status
    /// when it is safe to do so.
    pub async fn sleep_stop(&self) -> SleepStatus {
        self.engine.stop().await
    }

    pub fn sleep_status(&self) -> SleepStatus {
        self.engine.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn sleep_mode_round_trips_through_the_command_surface() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        assert!(!core.sleep_status().sleep_mode);
        assert!(core.sleep_start().await.sleep_mode);
        assert!(core.sleep_status().sleep_mode);
        assert!(!core.sleep_stop().await.sleep_mode);
        assert!(!core.sleep_status().sleep_mode);
    }
}
