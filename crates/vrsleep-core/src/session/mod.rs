//! Auth session lifecycle: login, two-factor verification, logout, and the
//! cookie jar every API call rides on.
//!
//! Exactly one session exists per process. It is created empty by the
//! unauthenticated config call, populated through login → (optional 2FA) →
//! verified, persisted only once both a user id and cookies exist, and
//! destroyed on logout.

mod cookies;
mod store;

pub use cookies::CookieJar;
pub use store::SessionStore;

use std::sync::Arc;

use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::types::UserProfile;
use crate::api::{build_url, send_json};
use crate::config::CoreConfig;
use crate::error::{CoreError, Result};

/// The process-wide authentication state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub cookies: CookieJar,
    pub user_id: Option<String>,
    pub user: Option<UserProfile>,
}

/// Pure read of the current auth state, used as a readiness gate.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    pub user_id: Option<String>,
    pub user: Option<UserProfile>,
}

/// Outcome of a password login: either a full session, or a demand for a
/// second factor with the list of accepted methods.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum LoginOutcome {
    #[serde(rename = "ok")]
    Ok { user: UserProfile },
    #[serde(rename = "2fa")]
    TwoFactorRequired { methods: Vec<String> },
}

/// Readiness gate consulted by the engine before firing API calls.
pub trait AuthGate: Send + Sync {
    fn is_ready_for_api(&self) -> bool;
}

/// Owns the in-memory [`Session`] and executes the login/2FA/logout protocol
/// against the vendor, merging `Set-Cookie` headers into the jar as the flow
/// progresses.
pub struct AuthManager {
    http: reqwest::Client,
    config: Arc<CoreConfig>,
    store: SessionStore,
    session: RwLock<Option<Session>>,
}

impl AuthManager {
    pub fn new(config: Arc<CoreConfig>, http: reqwest::Client) -> Self {
        let store = SessionStore::new(&config.data_dir);
        let session = RwLock::new(store.load());
        Self {
            http,
            config,
            store,
            session,
        }
    }

    /// Fetch the unauthenticated config endpoint, seeding the session cookie
    /// jar. Resets any cached identity: the session restarts its lifecycle.
    pub async fn fetch_config(&self) -> Result<Value> {
        let url = build_url(&self.config, "/config");
        let request = self
            .http
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent);
        let (headers, json) = send_json(request).await?;

        let mut cookies = self.current_cookies();
        cookies.merge_headers(&headers);
        *self.session.write() = Some(Session {
            cookies,
            user_id: None,
            user: None,
        });
        Ok(json)
    }

    /// Password login. Seeds cookies via the config endpoint, then probes the
    /// profile endpoint with Basic auth. Persists the session only when the
    /// vendor hands back a user id together with cookies.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        self.fetch_config().await.map_err(|_| CoreError::Connectivity {
            message: "Failed to connect to VRChat API".to_string(),
        })?;

        let url = build_url(&self.config, "/auth/user");
        let request = self
            .http
            .get(&url)
            .basic_auth(username, Some(password))
            .header(header::USER_AGENT, &self.config.user_agent);
        let (headers, json) = send_json(request).await?;

        let mut cookies = self.current_cookies();
        cookies.merge_headers(&headers);
        let user_id = json
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        *self.session.write() = Some(Session {
            cookies: cookies.clone(),
            user_id: user_id.clone(),
            user: None,
        });

        let methods = two_factor_methods(&json);
        if !methods.is_empty() {
            tracing::info!("login requires a second factor: {methods:?}");
            return Ok(LoginOutcome::TwoFactorRequired { methods });
        }

        let user: UserProfile =
            serde_json::from_value(json).map_err(|err| CoreError::Internal {
                message: format!("unexpected profile payload: {err}"),
            })?;

        if let Some(id) = user_id {
            if !cookies.is_empty() {
                let session = Session {
                    cookies,
                    user_id: Some(id),
                    user: Some(user.clone()),
                };
                self.store.save(&session)?;
                *self.session.write() = Some(session);
            }
        }

        Ok(LoginOutcome::Ok { user })
    }

    /// Verify a second factor and complete the login. Requires the cookie jar
    /// seeded by a pending login attempt (or a previous session).
    pub async fn verify_two_factor(&self, kind: &str, code: &str) -> Result<UserProfile> {
        let mut cookies = self.current_cookies();
        if cookies.is_empty() {
            return Err(CoreError::NoPendingLogin);
        }

        let endpoint = two_factor_endpoint(kind).ok_or_else(|| CoreError::TwoFactorUnsupported {
            kind: kind.to_string(),
        })?;

        let url = build_url(&self.config, endpoint);
        let request = self
            .http
            .post(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, cookies.header_value())
            .json(&serde_json::json!({ "code": code }));
        let (headers, _) = send_json(request).await?;
        cookies.merge_headers(&headers);
        if let Some(session) = self.session.write().as_mut() {
            session.cookies = cookies.clone();
        }

        // The verification response carries no profile; fetch it now that the
        // cookie jar is fully upgraded.
        let url = build_url(&self.config, "/auth/user");
        let request = self
            .http
            .get(&url)
            .header(header::USER_AGENT, &self.config.user_agent)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::COOKIE, cookies.header_value());
        let (_, json) = send_json(request).await?;
        let user: UserProfile =
            serde_json::from_value(json).map_err(|err| CoreError::Internal {
                message: format!("unexpected profile payload: {err}"),
            })?;

        if !user.id.is_empty() {
            let session = Session {
                cookies,
                user_id: Some(user.id.clone()),
                user: Some(user.clone()),
            };
            self.store.save(&session)?;
            *self.session.write() = Some(session);
        }

        Ok(user)
    }

    /// Clear memory and delete the persisted file. Idempotent.
    pub fn logout(&self) {
        *self.session.write() = None;
        self.store.clear();
        tracing::info!("session cleared");
    }

    /// A session is authenticated once it carries both a cookie jar and a
    /// confirmed user id; a jar merely seeded by the config call (or left
    /// behind by a failed login) does not count.
    pub fn auth_status(&self) -> AuthStatus {
        let guard = self.session.read();
        match guard.as_ref() {
            Some(session) => AuthStatus {
                authenticated: !session.cookies.is_empty() && session.user_id.is_some(),
                user_id: session.user_id.clone(),
                user: session.user.clone(),
            },
            None => AuthStatus {
                authenticated: false,
                user_id: None,
                user: None,
            },
        }
    }

    /// Standard headers for authenticated API calls, or `None` when no
    /// usable cookie jar exists.
    pub fn auth_headers(&self) -> Option<HeaderMap> {
        let guard = self.session.read();
        let session = guard.as_ref()?;
        if session.cookies.is_empty() {
            return None;
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent).ok()?,
        );
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&session.cookies.header_value()).ok()?,
        );
        Some(headers)
    }

    fn current_cookies(&self) -> CookieJar {
        self.session
            .read()
            .as_ref()
            .map(|session| session.cookies.clone())
            .unwrap_or_default()
    }
}

impl AuthGate for AuthManager {
    fn is_ready_for_api(&self) -> bool {
        self.session
            .read()
            .as_ref()
            .is_some_and(|session| !session.cookies.is_empty())
    }
}

fn two_factor_endpoint(kind: &str) -> Option<&'static str> {
    match kind {
        "totp" => Some("/auth/twofactorauth/totp/verify"),
        "otp" => Some("/auth/twofactorauth/otp/verify"),
        "email" => Some("/auth/twofactorauth/emailotp/verify"),
        _ => None,
    }
}

fn two_factor_methods(json: &Value) -> Vec<String> {
    json.get("requiresTwoFactorAuth")
        .and_then(Value::as_array)
        .map(|methods| {
            methods
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
