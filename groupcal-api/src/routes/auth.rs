/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/register` - Register new user
/// - `POST /api/token` - Login (form-encoded, OAuth2 password-flow shape)
/// - `POST /api/token/refresh` - Exchange a refresh token for a new access
///   token
///
/// Raw passwords never leave this module; every other endpoint sees only
/// the validated Bearer identity.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Form, State},
    Json,
};
use groupcal_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::users::UserResponse;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Login name
    #[validate(length(min = 3, max = 50, message = "Username must be 3-50 characters"))]
    pub username: String,

    /// Password
    #[validate(length(min = 6, max = 128, message = "Password must be 6-128 characters"))]
    pub password: String,

    /// Optional display name
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub full_name: Option<String>,
}

/// Login request (form fields, OAuth2 password-flow shape)
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login name
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// Access token (30 minutes)
    pub access_token: String,

    /// Refresh token (30 days)
    pub refresh_token: String,

    /// Token scheme, always "bearer"
    pub token_type: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (30 minutes)
    pub access_token: String,

    /// Token scheme, always "bearer"
    pub token_type: String,
}

/// Registration handler
///
/// Creates a new account. The response is the public profile; tokens are
/// obtained separately via the login endpoint.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: field validation failed
/// - `409 Conflict`: email or username already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let password_hash = password::hash_password(&req.password)?;

    // Duplicate email/username surfaces as 409 via the unique constraints
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email,
            username: req.username,
            password_hash,
            full_name: req.full_name,
        },
    )
    .await?;

    Ok(Json(user.into()))
}

/// Login handler
///
/// Verifies the username/password pair and issues an access/refresh token
/// pair. The failure message never says which of the two was wrong.
///
/// # Errors
///
/// - `401 Unauthorized`: unknown username or wrong password
pub async fn login(
    State(state): State<AppState>,
    Form(req): Form<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(TokenResponse {
        access_token,
        refresh_token,
        token_type: "bearer".to_string(),
    }))
}

/// Token refresh handler
///
/// # Errors
///
/// - `401 Unauthorized`: invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
