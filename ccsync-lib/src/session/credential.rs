//! SessionCredential and the claims decoded from its token

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::auth::AuthIdentity;

/// Claims about the signed-in subject, as carried by an ID token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectClaims {
    /// Subject (user id).
    #[serde(rename = "sub", default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
    /// Every other claim, untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SubjectClaims {
    /// Decodes the payload segment of a JWT.
    ///
    /// The signature is not verified; the backend does that. Returns `None` for
    /// anything that is not a three-segment token with a JSON object payload.
    /// Tokens without `sub` take their subject from `user_id`.
    pub fn from_jwt(token: &str) -> Option<Self> {
        let mut segments = token.split('.');
        let (_, payload, _) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() {
            return None;
        }

        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        let mut claims: Self = serde_json::from_slice(&bytes).ok()?;
        if claims.subject.is_none() {
            claims.subject = claims
                .extra
                .get("user_id")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string);
        }
        Some(claims)
    }

    /// Claims derived from a provider identity, for tokens that do not decode.
    pub fn from_identity(identity: &AuthIdentity) -> Self {
        Self {
            subject: Some(identity.uid.clone()),
            email: identity.email.clone(),
            name: identity.display_name.clone(),
            ..Default::default()
        }
    }
}

/// The credential handed to callers of
/// [`current_session`](super::SessionCoordinator::current_session).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// The bearer token used for API authentication.
    pub raw_token: String,
    /// When the token was obtained.
    pub last_issued_at: DateTime<Utc>,
    pub claims: SubjectClaims,
}

impl SessionCredential {
    /// Creates a credential, decoding claims from the token when possible.
    pub fn new(raw_token: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        let raw_token = raw_token.into();
        let claims = SubjectClaims::from_jwt(&raw_token).unwrap_or_default();
        Self {
            raw_token,
            last_issued_at: issued_at,
            claims,
        }
    }

    /// Returns `true` if the credential is older than `threshold`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: std::time::Duration) -> bool {
        let threshold = chrono::Duration::from_std(threshold).unwrap_or(chrono::Duration::zero());
        now - self.last_issued_at > threshold
    }

    /// Returns `false` only if the claims name a different subject.
    pub fn belongs_to(&self, uid: &str) -> bool {
        self.claims
            .subject
            .as_deref()
            .is_none_or(|subject| subject == uid)
    }

    /// Returns the token as a bearer authorization header value.
    pub fn as_bearer(&self) -> String {
        format!("Bearer {}", self.raw_token)
    }
}
