/// Authentication context for request handlers
///
/// The API server's auth layer validates the Bearer token and inserts an
/// `AuthContext` into request extensions; handlers extract it with Axum's
/// `Extension` extractor:
///
/// ```text
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("User: {}", auth.user_id)
/// }
/// ```
///
/// `AuthError` is the auth layer's failure taxonomy; the API crate maps it
/// onto HTTP statuses (401 for missing/invalid credentials, 400 for a
/// malformed scheme).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::Claims;

/// Authentication context added to request extensions
///
/// Present on every request that passed the auth layer; carries the
/// already-authenticated user identity and nothing else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context from validated JWT claims
    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.sub,
        }
    }
}

/// Error type for authentication failures in the auth layer
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing authorization header")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Invalid authorization format: {0}")]
    InvalidFormat(String),

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(String),
}
