/// Authorization helpers for group access
///
/// Every endpoint that touches a group reduces to one or both of these
/// checks:
///
/// 1. **Membership**: the requester must be a member of the group. A failed
///    check is indistinguishable from the group not existing: the error
///    maps to HTTP 404, never 403, so group existence is not leaked to
///    non-members.
/// 2. **Ownership**: for group mutation (rename), the requester must also
///    be the owner. This check runs only after membership is established,
///    so a member who is not the owner gets a distinct 403.
///
/// # Example
///
/// ```no_run
/// use groupcal_shared::auth::authorization::{require_membership, require_owner};
/// use groupcal_shared::models::group::Group;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// async fn check(pool: &PgPool, group: &Group, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
///     require_membership(pool, group.id, user_id).await?;
///     require_owner(group, user_id)?;
///     Ok(())
/// }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::group::Group;
use crate::models::membership::Membership;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Group doesn't exist or the requester is not a member (deliberately
    /// conflated)
    #[error("Group {0} not found or requester is not a member")]
    NotMemberOrMissing(Uuid),

    /// Requester is a member but not the owner
    #[error("Only the group owner may perform this action")]
    NotOwner,

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Checks that a user is a member of a group
///
/// # Errors
///
/// Returns `AuthzError::NotMemberOrMissing` when no membership row exists,
/// whether because the group is absent or the user never joined it.
pub async fn require_membership(
    pool: &PgPool,
    group_id: Uuid,
    user_id: Uuid,
) -> Result<(), AuthzError> {
    let is_member = Membership::exists(pool, group_id, user_id).await?;

    if !is_member {
        return Err(AuthzError::NotMemberOrMissing(group_id));
    }

    Ok(())
}

/// Checks that a user owns a group
///
/// Call only after the group was fetched through a membership-scoped lookup,
/// so non-members never reach this check.
pub fn require_owner(group: &Group, user_id: Uuid) -> Result<(), AuthzError> {
    if group.owner_id != user_id {
        return Err(AuthzError::NotOwner);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group_owned_by(owner_id: Uuid) -> Group {
        Group {
            id: Uuid::new_v4(),
            name: "test".to_string(),
            description: None,
            invite_code: "ABCD1234".to_string(),
            owner_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_require_owner() {
        let owner_id = Uuid::new_v4();
        let group = group_owned_by(owner_id);

        assert!(require_owner(&group, owner_id).is_ok());
        assert!(matches!(
            require_owner(&group, Uuid::new_v4()),
            Err(AuthzError::NotOwner)
        ));
    }

    #[test]
    fn test_authz_error_display() {
        let group_id = Uuid::new_v4();
        let err = AuthzError::NotMemberOrMissing(group_id);
        assert!(err.to_string().contains("not found"));
        assert!(err.to_string().contains("not a member"));

        let err = AuthzError::NotOwner;
        assert!(err.to_string().contains("owner"));
    }
}
