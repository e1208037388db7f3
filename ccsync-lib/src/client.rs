//! Bearer-authorized client for the CCSync backend

use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::Client;
use reqwest::Method;
use reqwest::RequestBuilder;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ApiError;
use crate::session::SessionCoordinator;

/// Client for the CCSync REST API (members, events, officers, requirements).
///
/// Every request asks the [`SessionCoordinator`] for the current session and
/// sends its token as `Authorization: Bearer ...`. Without a session the request
/// is not sent and [`ApiError::Unauthenticated`] is returned.
///
/// This client is cheap to clone (uses `Arc` internally).
///
/// # Example
///
/// ```ignore
/// let api = ApiClient::builder()
///     .url("https://ccsync.example.edu/api")
///     .session(sessions.clone())
///     .timeout(Duration::from_secs(30))
///     .build()?;
///
/// let events: Vec<Event> = api.get("events").await?;
/// ```
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    base_url: String,
    session: Arc<SessionCoordinator>,
    http_client: Client,
    timeout: Option<Duration>,
}

impl ApiClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> ApiClientBuilder<Missing, Missing> {
        ApiClientBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// `GET` a JSON resource.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.request(Method::GET, path).await?;
        Self::read_json(request).await
    }

    /// `POST` a JSON body and read the JSON response.
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::POST, path).await?.json(body);
        Self::read_json(request).await
    }

    /// `PUT` a JSON body and read the JSON response.
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let request = self.request(Method::PUT, path).await?.json(body);
        Self::read_json(request).await
    }

    /// `DELETE` a resource. Any response body is ignored.
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path).await?;
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), body))
        }
    }

    /// Resolves `path` against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        join_url(&self.inner.base_url, path)
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        let session = self
            .inner
            .session
            .current_session()
            .await
            .ok_or(ApiError::Unauthenticated)?;

        debug!("{} {}", method, url);
        let mut request = self
            .inner
            .http_client
            .request(method, url)
            .bearer_auth(&session.raw_token);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        Ok(request)
    }

    async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::http(status.as_u16(), body));
        }

        serde_json::from_str(&body).map_err(|e| ApiError::parse_with_body(e.to_string(), body))
    }
}

fn join_url(base: &str, path: &str) -> Result<Url, ApiError> {
    let raw = format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", raw, e)))
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing an [`ApiClient`].
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `session` - The shared [`SessionCoordinator`]
pub struct ApiClientBuilder<U, S> {
    url: U,
    session: S,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl ApiClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            session: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for ApiClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> ApiClientBuilder<Missing, S> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> ApiClientBuilder<Set<String>, S> {
        ApiClientBuilder {
            url: Set(url.into()),
            session: self.session,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> ApiClientBuilder<U, Missing> {
    /// Sets the session coordinator that supplies bearer tokens.
    pub fn session(
        self,
        session: Arc<SessionCoordinator>,
    ) -> ApiClientBuilder<U, Set<Arc<SessionCoordinator>>> {
        ApiClientBuilder {
            url: self.url,
            session: Set(session),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, S> ApiClientBuilder<U, S> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout, applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl ApiClientBuilder<Set<String>, Set<Arc<SessionCoordinator>>> {
    /// Builds the [`ApiClient`].
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be created.
    pub fn build(self) -> Result<ApiClient, ApiError> {
        let base_url = self.url.0;
        join_url(&base_url, "")?;

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build()?
            }
        };

        Ok(ApiClient {
            inner: Arc::new(ApiClientInner {
                base_url,
                session: self.session.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_normalizes_slashes() {
        assert_eq!(
            join_url("https://ccsync.example.edu/api/", "/events/7").unwrap().as_str(),
            "https://ccsync.example.edu/api/events/7"
        );
        assert_eq!(
            join_url("https://ccsync.example.edu/api", "members?active=true").unwrap().as_str(),
            "https://ccsync.example.edu/api/members?active=true"
        );
    }

    #[test]
    fn test_join_url_rejects_relative_base() {
        assert!(matches!(join_url("ccsync/api", "events"), Err(ApiError::InvalidUrl(_))));
    }
}
