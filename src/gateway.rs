use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::{Result, TranskribusError};
use crate::session::Session;

/// Query parameters; `None` values are left out of the URL.
pub(crate) type Query<'a> = [(&'a str, Option<String>)];

/// Issues authenticated calls against the REST API.
///
/// Every request carries a freshly validated session cookie. A non-2xx
/// response becomes [`TranskribusError::Request`] right away; nothing is
/// retried.
#[derive(Debug)]
pub(crate) struct Gateway {
    session: Session,
}

impl Gateway {
    /// Requests go to the session's server through the session's HTTP client.
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub(crate) async fn get(&mut self, path: &str, query: &Query<'_>) -> Result<Response> {
        let req = self.session.http().get(self.url(path)).query(&present(query));
        self.send(req).await
    }

    pub(crate) async fn post_form<F: Serialize + ?Sized>(
        &mut self,
        path: &str,
        query: &Query<'_>,
        form: &F,
    ) -> Result<Response> {
        let req = self
            .session
            .http()
            .post(self.url(path))
            .query(&present(query))
            .form(form);
        self.send(req).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized>(
        &mut self,
        path: &str,
        query: &Query<'_>,
        body: &B,
    ) -> Result<Response> {
        let req = self
            .session
            .http()
            .post(self.url(path))
            .query(&present(query))
            .json(body);
        self.send(req).await
    }

    pub(crate) async fn put_multipart(&mut self, path: &str, form: Form) -> Result<Response> {
        let req = self.session.http().put(self.url(path)).multipart(form);
        self.send(req).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.session.base_url(), path.trim_start_matches('/'))
    }

    async fn send(&mut self, req: RequestBuilder) -> Result<Response> {
        let headers = self.session.auth_header().await?;
        let response = req.headers(headers).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "request rejected");
        Err(TranskribusError::Request {
            status_code: status.as_u16(),
            body,
        })
    }
}

fn present<'a>(query: &'a Query<'_>) -> Vec<(&'a str, &'a str)> {
    query
        .iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
        .collect()
}

/// Decode a JSON response body.
pub(crate) async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
