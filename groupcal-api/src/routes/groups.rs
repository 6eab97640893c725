/// Group endpoints
///
/// # Endpoints
///
/// - `POST /api/groups` - Create group (creator becomes owner and first
///   member, atomically)
/// - `GET /api/groups` - List groups the requester is a member of
/// - `GET /api/groups/:id` - Get one group (members only)
/// - `PUT /api/groups/:id` - Rename (owner only)
/// - `GET /api/groups/:id/members` - List members (members only)
///
/// Reads are membership-scoped: a non-member gets the same 404 whether the
/// group exists or not.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use groupcal_shared::{
    auth::{authorization, middleware::AuthContext},
    models::{
        group::{CreateGroup, Group},
        membership::{GroupMember, Membership},
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Group creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    /// Group name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Group rename request
#[derive(Debug, Deserialize, Validate)]
pub struct RenameGroupRequest {
    /// New group name
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,
}

/// Group creation handler
///
/// Inserts the group and the creator's membership in one transaction; the
/// creator is the owner and the only member immediately afterwards.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: name fails validation
pub async fn create_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateGroupRequest>,
) -> ApiResult<Json<Group>> {
    req.validate()?;

    let group = Group::create_with_owner(
        &state.db,
        CreateGroup {
            name: req.name,
            description: req.description,
        },
        auth.user_id,
    )
    .await?;

    Ok(Json(group))
}

/// My-groups listing handler
///
/// Returns exactly the groups the requester is currently a member of.
pub async fn list_groups(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Group>>> {
    let groups = Group::list_for_member(&state.db, auth.user_id).await?;

    Ok(Json(groups))
}

/// Single-group handler
///
/// # Errors
///
/// - `404 Not Found`: group absent or requester not a member (conflated)
pub async fn get_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<Group>> {
    let group = Group::find_for_member(&state.db, group_id, auth.user_id)
        .await?
        .ok_or_else(ApiError::group_not_found)?;

    Ok(Json(group))
}

/// Member listing handler
///
/// # Errors
///
/// - `404 Not Found`: group absent or requester not a member (conflated)
pub async fn list_members(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(group_id): Path<Uuid>,
) -> ApiResult<Json<Vec<GroupMember>>> {
    authorization::require_membership(&state.db, group_id, auth.user_id).await?;

    let members = Membership::list_members(&state.db, group_id).await?;

    Ok(Json(members))
}

/// Group rename handler
///
/// Membership is checked first, so outsiders get the conflated 404; only a
/// member who is not the owner sees the 403.
///
/// # Errors
///
/// - `404 Not Found`: group absent or requester not a member (conflated)
/// - `403 Forbidden`: requester is a member but not the owner
/// - `422 Unprocessable Entity`: name fails validation
pub async fn rename_group(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(group_id): Path<Uuid>,
    Json(req): Json<RenameGroupRequest>,
) -> ApiResult<Json<Group>> {
    req.validate()?;

    let group = Group::find_for_member(&state.db, group_id, auth.user_id)
        .await?
        .ok_or_else(ApiError::group_not_found)?;

    authorization::require_owner(&group, auth.user_id)?;

    let group = Group::rename(&state.db, group_id, &req.name)
        .await?
        .ok_or_else(ApiError::group_not_found)?;

    Ok(Json(group))
}
