use std::time::Duration;

use chrono::TimeDelta;
use tracing::debug;

use crate::collections::Collections;
use crate::errors::{Result, TranskribusError};
use crate::gateway::Gateway;
use crate::jobs::Jobs;
use crate::session::Session;
use crate::uploads::Uploads;

pub const DEFAULT_BASE_URL: &str = "https://transkribus.eu/TrpServer/rest";

/// How long a session token is assumed to stay valid. The server does not
/// say, so this is a client-side guess.
pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(12 * 60 * 60);

/// Builder for logging in a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use transkribus::ClientBuilder;
/// use std::time::Duration;
///
/// # async fn example() -> transkribus::Result<()> {
/// let client = ClientBuilder::new()
///     .credentials("user@example.com", "secret")
///     .timeout(Duration::from_secs(120))
///     .login()
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    username: Option<String>,
    password: Option<String>,
    base_url: String,
    timeout: Option<Duration>,
    session_lifetime: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            username: None,
            password: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            session_lifetime: DEFAULT_SESSION_LIFETIME,
        }
    }

    /// Set the account to log in with.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Override the base URL (defaults to `https://transkribus.eu/TrpServer/rest`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set an HTTP request timeout. Without one, the transport default applies.
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = Some(d);
        self
    }

    /// Set how long a session token is trusted before it gets refreshed
    /// (defaults to 12 hours).
    pub fn session_lifetime(mut self, d: Duration) -> Self {
        self.session_lifetime = d;
        self
    }

    /// Log in and build the [`Client`].
    ///
    /// Credentials not set via [`credentials`](Self::credentials) are read
    /// from `TRANSKRIBUS_USERNAME` and `TRANSKRIBUS_PASSWORD`.
    ///
    /// Returns [`TranskribusError::InvalidConfig`] if no credentials are
    /// available and [`TranskribusError::Authentication`] if the server
    /// rejects them.
    pub async fn login(self) -> Result<Client> {
        let username = self
            .username
            .or_else(|| std::env::var("TRANSKRIBUS_USERNAME").ok())
            .ok_or_else(|| {
                TranskribusError::InvalidConfig(
                    "username is required. Pass it to ClientBuilder::credentials() \
                     or set the TRANSKRIBUS_USERNAME environment variable."
                        .into(),
                )
            })?;
        let password = self
            .password
            .or_else(|| std::env::var("TRANSKRIBUS_PASSWORD").ok())
            .ok_or_else(|| {
                TranskribusError::InvalidConfig(
                    "password is required. Pass it to ClientBuilder::credentials() \
                     or set the TRANSKRIBUS_PASSWORD environment variable."
                        .into(),
                )
            })?;
        let lifetime = TimeDelta::from_std(self.session_lifetime).map_err(|_| {
            TranskribusError::InvalidConfig(format!(
                "session lifetime {:?} is out of range",
                self.session_lifetime
            ))
        })?;

        let mut http = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(TranskribusError::Http)?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        let session = Session::login(http, &base_url, &username, &password, lifetime).await?;
        debug!(expires_at = %session.expires_at(), "logged in");

        Ok(Client {
            gateway: Gateway::new(session),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A logged-in Transkribus API client.
///
/// Use [`Client::login`] for quick construction or [`ClientBuilder`] for
/// full control. Call [`close`](Client::close) when done to revoke the
/// session on the server.
///
/// # Example
///
/// ```no_run
/// use transkribus::{Client, UploadPage};
///
/// # async fn example() -> transkribus::Result<()> {
/// let mut client = Client::login("user@example.com", "secret").await?;
///
/// let pages = vec![UploadPage::new("scans/0001.jpg", None, 1)?];
/// let doc_id = client
///     .upload_document(42, "Parish register", &pages, &Default::default())
///     .await?;
/// println!("uploaded as document {doc_id}");
///
/// client.close().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    pub(crate) gateway: Gateway,
}

impl Client {
    /// Log in with the given credentials and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub async fn login(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().credentials(username, password).login().await
    }

    /// Wrap an existing session, e.g. one resumed with [`Session::new`].
    ///
    /// Requests use the session's HTTP client and server.
    pub fn from_session(session: Session) -> Self {
        Self {
            gateway: Gateway::new(session),
        }
    }

    pub fn session(&self) -> &Session {
        self.gateway.session()
    }

    /// Direct access to the session, e.g. for a forced
    /// [`refresh`](Session::refresh).
    pub fn session_mut(&mut self) -> &mut Session {
        self.gateway.session_mut()
    }

    /// Collection, document and page requests.
    pub fn collections(&mut self) -> Collections<'_> {
        Collections::new(&mut self.gateway)
    }

    /// Job requests.
    pub fn jobs(&mut self) -> Jobs<'_> {
        Jobs::new(&mut self.gateway)
    }

    /// Low-level upload requests. Most callers want
    /// [`upload_document`](Client::upload_document).
    pub fn uploads(&mut self) -> Uploads<'_> {
        Uploads::new(&mut self.gateway)
    }

    /// Log out, revoking the session token on the server.
    pub async fn close(mut self) -> Result<bool> {
        self.gateway.session_mut().logout().await
    }
}
