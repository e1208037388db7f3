//! Shared Firebase REST utilities

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use url::Url;

use crate::error::AuthError;

// =============================================================================
// URL Helpers
// =============================================================================

/// Build an endpoint URL with the API key as query parameter.
pub(crate) fn endpoint_url(base: &str, path: &str, api_key: &str) -> Result<Url, AuthError> {
    let raw = format!("{}/{}", base.trim_end_matches('/'), path);
    let mut url = Url::parse(&raw).map_err(|e| AuthError::Parse(format!("invalid endpoint {}: {}", raw, e)))?;
    url.query_pairs_mut().append_pair("key", api_key);
    Ok(url)
}

// =============================================================================
// Token Response Parsing
// =============================================================================

/// Response from `accounts:signInWithPassword`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignInResponse {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<u64>,
}

/// Response from the secure token endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshResponse {
    pub id_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_expires_in")]
    pub expires_in: Option<u64>,
}

/// Deserializes `expires_in` which can be either a number or a string.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(u64),
    }

    match Option::<StringOrNumber>::deserialize(deserializer)? {
        None => Ok(None),
        Some(StringOrNumber::Number(n)) => Ok(Some(n)),
        Some(StringOrNumber::String(s)) => s
            .parse::<u64>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid expires_in value: {}", s))),
    }
}

/// Firebase ID tokens live one hour.
const DEFAULT_LIFETIME_SECS: i64 = 3600;

/// Expiry instant for a token issued now.
///
/// Lifetimes that do not fit a timestamp fall back to one hour.
pub(crate) fn expires_at(expires_in: Option<u64>) -> DateTime<Utc> {
    let now = Utc::now();
    expires_in
        .and_then(|secs| i64::try_from(secs).ok())
        .and_then(Duration::try_seconds)
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or_else(|| now + Duration::seconds(DEFAULT_LIFETIME_SECS))
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Error envelope returned by Google APIs.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Maps Firebase error codes to AuthError variants.
///
/// Messages look like `INVALID_PASSWORD` or
/// `TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been disabled...`.
pub(crate) fn map_error_response(error: ErrorResponse) -> AuthError {
    let message = error.error.message;
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default()
        .to_string();

    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL" => {
            AuthError::InvalidCredentials
        }
        "TOKEN_EXPIRED" | "INVALID_REFRESH_TOKEN" | "INVALID_GRANT_TYPE" | "USER_NOT_FOUND" => {
            AuthError::TokenExpired { message }
        }
        "USER_DISABLED" => AuthError::UserDisabled,
        "" => AuthError::Parse("empty error response".to_string()),
        _ => AuthError::Provider { code, message },
    }
}

/// Reads a token endpoint response, mapping non-2xx bodies to [`AuthError`].
pub(crate) async fn handle_response<T>(response: reqwest::Response) -> Result<T, AuthError>
where
    T: serde::de::DeserializeOwned,
{
    if response.status().is_success() {
        Ok(response.json().await?)
    } else {
        let status = response.status();
        let error_response: ErrorResponse =
            response.json().await.unwrap_or_else(|_| ErrorResponse {
                error: ErrorBody {
                    message: format!("HTTP_{}", status.as_u16()),
                },
            });
        Err(map_error_response(error_response))
    }
}
