//! Principal loading and classification.
//!
//! A Principal is the authenticated actor behind a request. It is resolved
//! fresh from the session store on every request; it is never cached, because
//! role and organization assignment can change between requests.

use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{OrganizationId, ProfileId, UserId};

/// The authenticated actor making a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub organization_id: Option<OrganizationId>,
    pub profile_id: Option<ProfileId>,
    pub profile_name: Option<String>,
    pub is_super_admin: bool,
}

/// Coarse principal classification used by the request gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalClass {
    /// Global platform operator; independent of any organization.
    SuperAdmin,
    /// Member whose assigned profile is the reserved "System Administrator"
    /// template.
    SystemAdmin,
    /// Any other organization member.
    Member,
}

impl Principal {
    pub fn class(&self) -> PrincipalClass {
        if self.is_super_admin {
            PrincipalClass::SuperAdmin
        } else if self.profile_name.as_deref() == Some(db::profiles::SYSTEM_ADMINISTRATOR) {
            PrincipalClass::SystemAdmin
        } else {
            PrincipalClass::Member
        }
    }
}

/// Resolve a session ID to a Principal. Returns Ok(None) for expired or
/// unknown sessions and for sessions pointing at a deleted user; both read
/// as "unauthenticated" to the caller.
pub async fn current_principal(
    pool: &SqlitePool,
    session_id: &str,
) -> Result<Option<Principal>, sqlx::Error> {
    let Some(session) = db::sessions::find_valid(pool, session_id).await? else {
        return Ok(None);
    };

    let Ok(user_id) = UserId::from_string(&session.user_id) else {
        tracing::warn!(session_id = %session.id, "session references malformed user id");
        return Ok(None);
    };

    let Some(user) = db::users::find_by_id(pool, &user_id).await? else {
        return Ok(None);
    };

    let organization_id = match user.organization_id.as_deref() {
        Some(raw) => match OrganizationId::from_string(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(user_id = %user.id, "user references malformed organization id");
                None
            }
        },
        None => None,
    };

    let profile_id = match user.profile_id.as_deref() {
        Some(raw) => match ProfileId::from_string(raw) {
            Ok(id) => Some(id),
            Err(_) => {
                tracing::warn!(user_id = %user.id, "user references malformed profile id");
                None
            }
        },
        None => None,
    };

    let profile_name = match &profile_id {
        Some(id) => db::profiles::find_by_id(pool, id).await?.map(|p| p.name),
        None => None,
    };

    Ok(Some(Principal {
        user_id,
        email: user.email,
        organization_id,
        profile_id,
        profile_name,
        is_super_admin: user.is_super_admin,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(is_super_admin: bool, profile_name: Option<&str>) -> Principal {
        Principal {
            user_id: UserId::new(),
            email: "member@example.com".to_string(),
            organization_id: None,
            profile_id: None,
            profile_name: profile_name.map(|s| s.to_string()),
            is_super_admin,
        }
    }

    #[test]
    fn super_admin_outranks_profile_name() {
        let p = principal(true, Some(db::profiles::SYSTEM_ADMINISTRATOR));
        assert_eq!(p.class(), PrincipalClass::SuperAdmin);
    }

    #[test]
    fn reserved_profile_name_classifies_as_system_admin() {
        let p = principal(false, Some(db::profiles::SYSTEM_ADMINISTRATOR));
        assert_eq!(p.class(), PrincipalClass::SystemAdmin);
    }

    #[test]
    fn everyone_else_is_a_member() {
        assert_eq!(principal(false, Some("Agent")).class(), PrincipalClass::Member);
        assert_eq!(principal(false, None).class(), PrincipalClass::Member);
    }
}
