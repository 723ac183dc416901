//! Session token lifecycle: login, refresh, logout.
//!
//! The service hands out an opaque session id and never says when it
//! expires, so the client assumes a fixed lifetime (12 hours unless
//! configured otherwise) and refreshes once that window has passed.
//! See [`DEFAULT_SESSION_LIFETIME`](crate::DEFAULT_SESSION_LIFETIME).

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use tracing::debug;

use crate::errors::{Result, TranskribusError};
use crate::mets;

/// An authenticated session with the Transkribus server.
///
/// Refresh and logout mutate the session in place, so every call that may
/// touch the token takes `&mut self`. Once logged out the session is
/// revoked for good and needs a fresh [`Session::login`].
#[derive(Debug)]
pub struct Session {
    token: String,
    expires_at: DateTime<Utc>,
    lifetime: TimeDelta,
    http: reqwest::Client,
    base_url: String,
}

impl Session {
    /// Log in with username and password.
    ///
    /// Returns [`TranskribusError::Authentication`] if the server rejects
    /// the credentials or its answer carries no session id.
    pub async fn login(
        http: reqwest::Client,
        base_url: impl Into<String>,
        username: &str,
        password: &str,
        lifetime: TimeDelta,
    ) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        debug!(user = username, "login");

        let resp = http
            .post(format!("{base_url}/auth/login"))
            .form(&[("user", username), ("pw", password)])
            .send()
            .await?;
        let token = session_id_from(resp, "login").await?;
        let now = Utc::now();

        Ok(Self {
            token,
            expires_at: now + lifetime,
            lifetime,
            http,
            base_url,
        })
    }

    /// Resume a session from a token obtained earlier.
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        token: impl Into<String>,
        expires_at: DateTime<Utc>,
        lifetime: TimeDelta,
    ) -> Self {
        Self {
            token: token.into(),
            expires_at,
            lifetime,
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Server root without a trailing slash.
    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The current session id. Empty once the session is revoked.
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `true` once the assumed lifetime has run out.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// `true` after a successful [`logout`](Self::logout).
    pub fn is_revoked(&self) -> bool {
        self.token.is_empty()
    }

    /// Cookie header for an authenticated request, refreshing the token
    /// first if it has expired.
    pub async fn auth_header(&mut self) -> Result<HeaderMap> {
        self.refresh(false).await?;
        self.cookie()
    }

    /// Refresh the token if it has expired, or unconditionally with `force`.
    ///
    /// Returns `true` if a refresh call was made, `false` if the token was
    /// still valid and nothing happened.
    pub async fn refresh(&mut self, force: bool) -> Result<bool> {
        self.ensure_live()?;
        if !force && !self.is_expired() {
            return Ok(false);
        }

        debug!(expires_at = %self.expires_at, force, "refresh session");
        // The stale token is the credential for its own refresh.
        let resp = self
            .http
            .post(format!("{}/auth/refresh", self.base_url))
            .headers(self.cookie()?)
            .send()
            .await?;
        let token = session_id_from(resp, "refresh").await?;
        let now = Utc::now();

        self.token = token;
        self.expires_at = now + self.lifetime;
        Ok(true)
    }

    /// Revoke the token on the server and mark the session as expired.
    pub async fn logout(&mut self) -> Result<bool> {
        let headers = self.auth_header().await?;
        debug!("logout");

        let resp = self
            .http
            .post(format!("{}/auth/logout", self.base_url))
            .headers(headers)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(rejected("logout", resp).await);
        }

        self.token.clear();
        self.expires_at = Utc::now();
        Ok(true)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.is_revoked() {
            return Err(TranskribusError::Authentication {
                message: "session has been logged out; log in again".into(),
            });
        }
        Ok(())
    }

    fn cookie(&self) -> Result<HeaderMap> {
        self.ensure_live()?;
        let value = HeaderValue::from_str(&format!("JSESSIONID={}", self.token)).map_err(|_| {
            TranskribusError::Authentication {
                message: "session id contains characters not allowed in a header".into(),
            }
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value);
        Ok(headers)
    }
}

/// Read the session id out of a login or refresh response.
async fn session_id_from(resp: reqwest::Response, action: &str) -> Result<String> {
    if !resp.status().is_success() {
        return Err(rejected(action, resp).await);
    }

    let body = resp.bytes().await?;
    match mets::first_text(&body, "sessionId") {
        Ok(Some(id)) if !id.is_empty() => Ok(id),
        Ok(_) => Err(TranskribusError::Authentication {
            message: format!("{action} response carries no session id"),
        }),
        Err(e) => Err(TranskribusError::Authentication {
            message: format!("{action} response could not be parsed: {e}"),
        }),
    }
}

async fn rejected(action: &str, resp: reqwest::Response) -> TranskribusError {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    TranskribusError::Authentication {
        message: format!("{action} rejected with status {status}: {text}"),
    }
}
