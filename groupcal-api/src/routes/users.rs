/// Authenticated user profile endpoints
///
/// # Endpoints
///
/// - `GET /api/users/me` - Current user's profile
/// - `PUT /api/users/me/color` - Update display color (the only mutable
///   profile field)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use groupcal_shared::{auth::middleware::AuthContext, models::user::User};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// User profile as returned by the API
///
/// Never carries credential material.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User ID
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Login name
    pub username: String,

    /// Optional display name
    pub full_name: Option<String>,

    /// Display color
    pub color: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            full_name: user.full_name,
            color: user.color,
            created_at: user.created_at,
        }
    }
}

/// Color update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateColorRequest {
    /// New display color, e.g. "#RRGGBB"
    #[validate(length(min = 4, max = 20, message = "Color must be between 4 and 20 characters"))]
    pub color: String,
}

/// Current user profile handler
///
/// # Errors
///
/// - `401 Unauthorized`: token valid but the account no longer exists
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user.into()))
}

/// Display color update handler
///
/// # Errors
///
/// - `422 Unprocessable Entity`: color fails validation
/// - `401 Unauthorized`: account no longer exists
pub async fn update_color(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateColorRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate()?;

    let user = User::update_color(&state.db, auth.user_id, &req.color)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(user.into()))
}
