/// Event endpoints
///
/// # Endpoints
///
/// - `POST /api/events` - Create an event in a group the requester belongs to
/// - `GET /api/events?group_id&year&month` - List visible events
///
/// The listing's base set is every event from the requester's groups. A
/// `group_id` filter only narrows within that set: filtering by a foreign
/// group yields an empty list, not an error.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, NaiveTime};
use groupcal_shared::{
    auth::middleware::AuthContext,
    models::{
        event::{CreateEvent, Event, EventFilter},
        group::Group,
    },
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

/// Event creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Event title
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Calendar date
    pub date: NaiveDate,

    /// Optional start time
    pub start_time: Option<NaiveTime>,

    /// Optional end time
    pub end_time: Option<NaiveTime>,

    /// Target group
    pub group_id: Uuid,
}

/// Event creation handler
///
/// # Errors
///
/// - `404 Not Found`: group absent or requester not a member (conflated)
/// - `400 Bad Request`: both times given and start >= end
/// - `422 Unprocessable Entity`: title fails validation
pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateEventRequest>,
) -> ApiResult<Json<Event>> {
    req.validate()?;

    // Membership gate before the time-range check: outsiders get the
    // conflated 404, never a hint about the rest of their payload
    Group::find_for_member(&state.db, req.group_id, auth.user_id)
        .await?
        .ok_or_else(ApiError::group_not_found)?;

    let data = CreateEvent {
        title: req.title,
        description: req.description,
        date: req.date,
        start_time: req.start_time,
        end_time: req.end_time,
        group_id: req.group_id,
    };

    if !data.has_valid_time_range() {
        return Err(ApiError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let event = Event::create(&state.db, data, auth.user_id).await?;

    Ok(Json(event))
}

/// Event listing handler
///
/// # Errors
///
/// - `400 Bad Request`: year or month outside the accepted range
pub async fn list_events(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<EventFilter>,
) -> ApiResult<Json<Vec<Event>>> {
    let window = filter.date_window()?;

    let events = Event::list_for_member(&state.db, auth.user_id, filter.group_id, window).await?;

    Ok(Json(events))
}
