use super::*;

impl VrSleepCore {
    pub fn whitelist(&self) -> Vec<String> {
        self.whitelist.get()
    }

    /// Overwrite the whole whitelist; returns the list as saved.
    pub fn set_whitelist(&self, list: Vec<String>) -> Vec<String> {
        self.whitelist.set(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn whitelist_round_trips_through_the_command_surface() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        assert!(core.whitelist().is_empty());
        let saved = core.set_whitelist(vec!["Alice".to_string(), "usr_123".to_string()]);
        assert_eq!(saved.len(), 2);
        assert_eq!(core.whitelist(), saved);
    }
}
