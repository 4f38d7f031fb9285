use super::*;
use crate::api::types::UserProfile;
use crate::api::VrcApi;
use crate::session::{AuthStatus, LoginOutcome};

impl VrSleepCore {
    /// Log in with username and password. Returns either the full profile or
    /// the list of accepted second-factor methods.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Username and password required.".to_string(),
            });
        }
        self.auth.login(username, password).await
    }

    /// Complete a pending login with a second-factor code.
    pub async fn verify_two_factor(&self, kind: &str, code: &str) -> Result<UserProfile> {
        let kind = kind.trim();
        let code = code.trim();
        if kind.is_empty() || code.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Verification code required.".to_string(),
            });
        }
        self.auth.verify_two_factor(kind, code).await
    }

    /// Clear the session in memory and on disk. Idempotent.
    pub fn logout(&self) {
        self.auth.logout();
    }

    pub fn auth_status(&self) -> AuthStatus {
        self.auth.auth_status()
    }

    /// Fresh fetch of the caller's own profile.
    pub async fn current_user(&self) -> Result<UserProfile> {
        self.api.get_current_user().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn login_rejects_blank_credentials_before_any_request() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        let err = core.login("   ", "hunter2").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
        let err = core.login("pixel", "").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn verify_rejects_blank_input_before_any_request() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        let err = core.verify_two_factor("totp", "  ").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput { .. }));
    }

    #[tokio::test]
    async fn fresh_core_reports_unauthenticated() {
        let dir = tempdir().unwrap();
        let core = VrSleepCore::new(CoreConfig::new(dir.path())).unwrap();

        let status = core.auth_status();
        assert!(!status.authenticated);
        assert!(status.user_id.is_none());
        core.logout();
        assert!(!core.auth_status().authenticated);
    }
}
