/// Errors that can occur during VRSleep operations.
///
/// Connectivity failures are retried implicitly by the next poll tick and are
/// never fatal; API errors carry the message extracted from the vendor's JSON
/// error body when one is present.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Failed to connect to VRChat API: {message}")]
    Connectivity { message: String },

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("No pending authentication cookies")]
    NoPendingLogin,

    #[error("Unsupported two-factor method: {kind}")]
    TwoFactorUnsupported { kind: String },

    #[error("VRChat API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Encryption is not available on this system")]
    EncryptionUnavailable,

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Cannot send invite: no valid world location found")]
    NoJoinableLocation,

    #[error("{message}")]
    InvalidInput { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    pub fn storage(err: impl std::fmt::Display) -> Self {
        CoreError::Storage {
            message: err.to_string(),
        }
    }

    /// True for transient network-level failures that the poll loop should
    /// silently retry on the next tick.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreError::Connectivity { .. })
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            "request timed out".to_string()
        } else {
            err.to_string()
        };
        CoreError::Connectivity { message }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
