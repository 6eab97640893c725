/// Membership model and database operations
///
/// Memberships are the many-to-many relation between groups and users, and
/// the unit every access decision reduces to: a user sees a group, its
/// members, and its events iff a membership row exists for the pair.
///
/// The relation is an explicit join table rather than object-graph sugar,
/// with first-class `create` / `exists` / `list_members` operations.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE memberships (
///     group_id UUID NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (group_id, user_id)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Membership row linking a user to a group
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Group ID
    pub group_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Member profile as exposed on the group-members listing
///
/// Carries only the public profile fields, never credentials.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GroupMember {
    /// User ID
    pub id: Uuid,

    /// Login name
    pub username: String,

    /// Optional display name
    pub full_name: Option<String>,

    /// Display color
    pub color: String,
}

impl Membership {
    /// Adds a user to a group
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The pair already exists (primary key violation)
    /// - Group or user doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO memberships (group_id, user_id)
            VALUES ($1, $2)
            RETURNING group_id, user_id, created_at
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Checks whether a user is a member of a group
    ///
    /// This is the primitive every access-control decision reduces to.
    pub async fn exists(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM memberships
                WHERE group_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists the members of a group with their public profile fields
    ///
    /// Ordered by join time. The caller is responsible for checking that the
    /// requester may see the group at all.
    pub async fn list_members(
        pool: &PgPool,
        group_id: Uuid,
    ) -> Result<Vec<GroupMember>, sqlx::Error> {
        let members = sqlx::query_as::<_, GroupMember>(
            r#"
            SELECT u.id, u.username, u.full_name, u.color
            FROM users u
            JOIN memberships m ON m.user_id = u.id
            WHERE m.group_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_member_has_no_credentials() {
        let member = GroupMember {
            id: Uuid::new_v4(),
            username: "ada".to_string(),
            full_name: None,
            color: "#007AFF".to_string(),
        };

        let json = serde_json::to_value(&member).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("username"));
        assert!(!obj.contains_key("email"));
        assert!(!obj.contains_key("password_hash"));
    }

    // Integration tests for database operations are in the API crate's tests/
}
