use std::path::{Path, PathBuf};

/// Default poll interval for the sleep-mode engine, in milliseconds.
pub const DEFAULT_POLL_MS: u64 = 15_000;

/// Absolute floor for the poll interval. Configured values below this are
/// clamped up, never down, to stay under the vendor's rate limit.
pub const MIN_POLL_MS: u64 = 10_000;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// Directory holding the session blob, whitelist, settings and slot cache.
    pub data_dir: PathBuf,
    /// Configured poll interval in milliseconds (clamped to [`MIN_POLL_MS`] by the engine).
    pub poll_interval_ms: u64,
    /// Optional API key appended as an `apiKey` query parameter to every call.
    pub api_key: Option<String>,
    /// User-Agent sent on every request.
    pub user_agent: String,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            poll_interval_ms: DEFAULT_POLL_MS,
            api_key: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Build a config from the environment: `VRSLEEP_POLL_MS`, `VRC_API_KEY`
    /// and `VRC_USER_AGENT` override the defaults, and the data directory is
    /// placed under the platform's user-data location.
    pub fn from_env() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        let mut config = Self::new(base.join("vrsleep"));

        if let Some(ms) = std::env::var("VRSLEEP_POLL_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
        {
            config.poll_interval_ms = ms;
        }
        if let Ok(key) = std::env::var("VRC_API_KEY") {
            if !key.is_empty() {
                config.api_key = Some(key);
            }
        }
        if let Ok(agent) = std::env::var("VRC_USER_AGENT") {
            if !agent.is_empty() {
                config.user_agent = agent;
            }
        }

        config
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new("vrsleep_data")
    }
}
