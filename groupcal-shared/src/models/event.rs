/// Event model, query filter, and database operations
///
/// Events are dated entries on a group's calendar. An event is visible to
/// exactly the members of its group; the listing query joins through the
/// memberships table so a caller only ever sees events from their own
/// groups.
///
/// Events are immutable after creation. They disappear only through the
/// cascading deletion of their group or creator.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(200) NOT NULL,
///     description TEXT,
///     date DATE NOT NULL,
///     start_time TIME,
///     end_time TIME,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Earliest year accepted by the listing filter
pub const MIN_FILTER_YEAR: i32 = 1900;

/// Latest year accepted by the listing filter
pub const MAX_FILTER_YEAR: i32 = 3000;

/// Error type for event filter validation
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// Year outside the accepted range
    #[error("year must be between {MIN_FILTER_YEAR} and {MAX_FILTER_YEAR}, got {0}")]
    YearOutOfRange(i32),

    /// Month outside 1..=12
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(u32),
}

/// Event model representing a dated calendar entry
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    /// Unique event ID (UUID v4)
    pub id: Uuid,

    /// Event title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Calendar date of the event
    pub date: NaiveDate,

    /// Optional start time
    pub start_time: Option<NaiveTime>,

    /// Optional end time; must be after `start_time` when both are set
    pub end_time: Option<NaiveTime>,

    /// User who created the event
    pub user_id: Uuid,

    /// Group the event belongs to
    pub group_id: Uuid,

    /// When the event was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    /// Event title
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

impl CreateEvent {
    /// Checks the time-range invariant: when both times are present, the
    /// start must be strictly before the end. Events with either side
    /// missing are untimed or open-ended and always valid.
    pub fn has_valid_time_range(&self) -> bool {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => start < end,
            _ => true,
        }
    }
}

/// Optional narrowing filters for the event listing
///
/// `year` and `month` only take effect together; supplying one without the
/// other applies no date filter at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    /// Narrow to a single group
    pub group_id: Option<Uuid>,

    /// Calendar year, valid range 1900..=3000
    pub year: Option<i32>,

    /// Calendar month, valid range 1..=12
    pub month: Option<u32>,
}

impl EventFilter {
    /// Resolves the filter into a half-open date window
    ///
    /// Returns `Ok(None)` when no date filter applies (neither or only one
    /// of year/month given), `Ok(Some((from, to)))` with
    /// `from = first day of the month` and `to = first day of the next
    /// month` otherwise. Out-of-range values are an error, never clamped.
    pub fn date_window(&self) -> Result<Option<(NaiveDate, NaiveDate)>, FilterError> {
        let (year, month) = match (self.year, self.month) {
            (Some(year), Some(month)) => (year, month),
            _ => return Ok(None),
        };

        if !(MIN_FILTER_YEAR..=MAX_FILTER_YEAR).contains(&year) {
            return Err(FilterError::YearOutOfRange(year));
        }
        if !(1..=12).contains(&month) {
            return Err(FilterError::MonthOutOfRange(month));
        }

        Ok(month_window(year, month))
    }
}

/// Computes the half-open window `[first day of month, first day of next month)`
///
/// December rolls over to January of the following year. Returns None only
/// for dates chrono cannot represent; for validated input it is always Some.
pub fn month_window(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let from = NaiveDate::from_ymd_opt(year, month, 1)?;
    let to = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };

    Some((from, to))
}

impl Event {
    /// Creates a new event
    ///
    /// The caller is responsible for the membership check and the time-range
    /// invariant; this is the raw store operation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Group or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(
        pool: &PgPool,
        data: CreateEvent,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, date, start_time, end_time, user_id, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, title, description, date, start_time, end_time,
                      user_id, group_id, created_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.date)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(user_id)
        .bind(data.group_id)
        .fetch_one(pool)
        .await?;

        Ok(event)
    }

    /// Lists events visible to a user, with optional narrowing
    ///
    /// The base set is every event belonging to a group the user is a member
    /// of. A `group_id` narrows within that set: a group the user is not a
    /// member of simply yields an empty list, not an error. The date window,
    /// when given, keeps events with `from <= date < to`.
    ///
    /// Ordering: ascending by date, then ascending by start time with
    /// untimed events last among those sharing a date.
    pub async fn list_for_member(
        pool: &PgPool,
        user_id: Uuid,
        group_id: Option<Uuid>,
        window: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        // Built dynamically: numbered binds appended in the same order below
        let mut sql = String::from(
            "SELECT e.id, e.title, e.description, e.date, e.start_time, e.end_time, \
                    e.user_id, e.group_id, e.created_at \
             FROM events e \
             JOIN memberships m ON m.group_id = e.group_id \
             WHERE m.user_id = $1",
        );
        let mut bind_count = 1;

        if group_id.is_some() {
            bind_count += 1;
            sql.push_str(&format!(" AND e.group_id = ${}", bind_count));
        }
        if window.is_some() {
            sql.push_str(&format!(
                " AND e.date >= ${} AND e.date < ${}",
                bind_count + 1,
                bind_count + 2
            ));
        }

        sql.push_str(" ORDER BY e.date ASC, e.start_time ASC NULLS LAST");

        let mut query = sqlx::query_as::<_, Event>(&sql).bind(user_id);

        if let Some(group_id) = group_id {
            query = query.bind(group_id);
        }
        if let Some((from, to)) = window {
            query = query.bind(from).bind(to);
        }

        let events = query.fetch_all(pool).await?;

        Ok(events)
    }
}
