/// Group model and database operations
///
/// A group is a shared calendar: its members see each other's events. Every
/// group has an owner (the creator) and a unique generated invite code.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE groups (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(120) NOT NULL,
///     description TEXT,
///     invite_code VARCHAR(16) NOT NULL UNIQUE,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Access model
///
/// Reads go through [`Group::find_for_member`], which only returns the group
/// when the requester is a member. A missing group and a group the requester
/// is not a member of are indistinguishable to the caller, which hides group
/// existence from non-members.
///
/// # Example
///
/// ```no_run
/// use groupcal_shared::models::group::{CreateGroup, Group};
/// # use sqlx::PgPool;
/// # use uuid::Uuid;
/// # async fn example(pool: PgPool, owner_id: Uuid) -> Result<(), sqlx::Error> {
/// // Creates the group and the owner's membership in one transaction
/// let group = Group::create_with_owner(
///     &pool,
///     CreateGroup {
///         name: "Family".to_string(),
///         description: None,
///     },
///     owner_id,
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Length of a generated invite code (characters)
pub const INVITE_CODE_LENGTH: usize = 8;

/// Group model representing a shared calendar
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Group {
    /// Unique group ID (UUID v4)
    pub id: Uuid,

    /// Group name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Short generated join token, unique across all groups
    pub invite_code: String,

    /// User who created the group; sole holder of rename privilege
    pub owner_id: Uuid,

    /// When the group was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    /// Group name
    pub name: String,

    /// Optional description
    pub description: Option<String>,
}

/// Generates a random invite code
///
/// Codes are 8 uppercase alphanumeric characters (A-Z, 0-9), drawn from the
/// thread RNG. Uniqueness is enforced by the database constraint.
pub fn generate_invite_code() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::thread_rng();

    (0..INVITE_CODE_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

impl Group {
    /// Creates a group and its owner's membership atomically
    ///
    /// The group row and the owner's membership row are inserted in a single
    /// transaction: either both persist or neither does. The creator becomes
    /// the owner and the first member.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The generated invite code collides (unique constraint violation)
    /// - The owner doesn't exist (foreign key violation)
    /// - Database connection fails
    pub async fn create_with_owner(
        pool: &PgPool,
        data: CreateGroup,
        owner_id: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name, description, invite_code, owner_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, invite_code, owner_id, created_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(generate_invite_code())
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO memberships (group_id, user_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(group.id)
        .bind(owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(group)
    }

    /// Membership-scoped group lookup
    ///
    /// Returns the group only when `user_id` is currently a member. Returns
    /// None both when the group doesn't exist and when the user is not a
    /// member; callers must not distinguish the two cases.
    pub async fn find_for_member(
        pool: &PgPool,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.name, g.description, g.invite_code, g.owner_id, g.created_at
            FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE g.id = $1 AND m.user_id = $2
            "#,
        )
        .bind(group_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(group)
    }

    /// Lists all groups the user is currently a member of
    ///
    /// Ordered by when the user joined each group.
    pub async fn list_for_member(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let groups = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.id, g.name, g.description, g.invite_code, g.owner_id, g.created_at
            FROM groups g
            JOIN memberships m ON m.group_id = g.id
            WHERE m.user_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(groups)
    }

    /// Renames a group
    ///
    /// The caller is responsible for the ownership check; this is the raw
    /// store operation. Returns the updated group if found, None otherwise.
    pub async fn rename(
        pool: &PgPool,
        group_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let group = sqlx::query_as::<_, Group>(
            r#"
            UPDATE groups
            SET name = $2
            WHERE id = $1
            RETURNING id, name, description, invite_code, owner_id, created_at
            "#,
        )
        .bind(group_id)
        .bind(name)
        .fetch_optional(pool)
        .await?;

        Ok(group)
    }

    /// Deletes a group by ID
    ///
    /// Cascades to the group's events and membership rows.
    ///
    /// Returns true if the group was deleted, false if it didn't exist.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invite_code_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LENGTH);
        assert!(code
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_invite_codes_are_distinct() {
        // Collisions over 36^8 codes are negligible across a handful of draws
        let codes: Vec<String> = (0..16).map(|_| generate_invite_code()).collect();
        for (i, a) in codes.iter().enumerate() {
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    // Integration tests for database operations are in the API crate's tests/
}
