//! The per-profile object permission catalog.
//!
//! **Rule**: absence grants nothing. A principal with no profile, or a
//! profile with no row for an object type, is denied. Deny-by-default is a
//! named branch here, not an accident of missing data.

use std::collections::HashMap;

use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{ObjectAction, ObjectType, ProfileId};
use crate::app::gate::cache::GateCaches;

/// Capability flags for one (profile, object type) pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectGrant {
    pub can_read: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_all: bool,
}

impl ObjectGrant {
    pub fn allows(&self, action: ObjectAction) -> bool {
        match action {
            ObjectAction::Read => self.can_read,
            ObjectAction::Create => self.can_create,
            ObjectAction::Edit => self.can_edit,
            ObjectAction::Delete => self.can_delete,
        }
    }
}

/// The parsed permission table of one profile.
#[derive(Debug, Clone, Default)]
pub struct ProfileGrants {
    grants: HashMap<ObjectType, ObjectGrant>,
}

impl ProfileGrants {
    /// Parse raw rows into the closed-enum table.
    ///
    /// Rows naming an unknown object type are skipped with a warning (they
    /// cannot grant anything). A row claiming view-all without read is
    /// contradictory and has its view-all flag demoted.
    pub fn from_rows(rows: &[db::profiles::ObjectPermissionRow]) -> Self {
        let mut grants = HashMap::new();
        for row in rows {
            let Ok(object_type) = row.object_type.parse::<ObjectType>() else {
                tracing::warn!(
                    profile_id = %row.profile_id,
                    object_type = %row.object_type,
                    "skipping permission row with unknown object type"
                );
                continue;
            };
            let mut can_view_all = row.can_view_all;
            if can_view_all && !row.can_read {
                tracing::warn!(
                    profile_id = %row.profile_id,
                    object_type = %row.object_type,
                    "view-all without read is contradictory; demoting view-all"
                );
                can_view_all = false;
            }
            grants.insert(
                object_type,
                ObjectGrant {
                    can_read: row.can_read,
                    can_create: row.can_create,
                    can_edit: row.can_edit,
                    can_delete: row.can_delete,
                    can_view_all,
                },
            );
        }
        Self { grants }
    }

    /// Whether this profile allows `action` on `object_type`. Missing rows
    /// deny.
    pub fn allows(&self, object_type: ObjectType, action: ObjectAction) -> bool {
        match self.grants.get(&object_type) {
            Some(grant) => grant.allows(action),
            // Deny-by-default: the catalog never grants implicitly.
            None => false,
        }
    }

    pub fn grant(&self, object_type: ObjectType) -> Option<&ObjectGrant> {
        self.grants.get(&object_type)
    }
}

/// Read-through access to profile permission tables.
pub struct PermissionCatalog<'a> {
    pool: &'a SqlitePool,
    caches: &'a GateCaches,
}

impl<'a> PermissionCatalog<'a> {
    pub fn new(pool: &'a SqlitePool, caches: &'a GateCaches) -> Self {
        Self { pool, caches }
    }

    /// Load (or reuse) the parsed grants for a profile.
    pub async fn grants_for(&self, profile_id: &ProfileId) -> Result<ProfileGrants, sqlx::Error> {
        let key = profile_id.as_str();
        if let Some(grants) = self.caches.profile_grants.get(&key) {
            return Ok(grants);
        }
        let rows = db::profiles::list_permissions(self.pool, profile_id).await?;
        let grants = ProfileGrants::from_rows(&rows);
        self.caches.profile_grants.insert(key, grants.clone());
        Ok(grants)
    }
}

/// Startup validation error for the stored catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("permission row for profile {profile_id} names unknown object type {object_type:?}")]
    UnknownObjectType {
        profile_id: String,
        object_type: String,
    },
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Validate every stored permission row against the closed object-type
/// enumeration. Run at startup so a bad row fails fast instead of silently
/// denying at request time.
pub async fn validate_all(pool: &SqlitePool) -> Result<(), CatalogError> {
    let rows = db::profiles::list_all_permissions(pool).await?;
    for row in &rows {
        if row.object_type.parse::<ObjectType>().is_err() {
            return Err(CatalogError::UnknownObjectType {
                profile_id: row.profile_id.clone(),
                object_type: row.object_type.clone(),
            });
        }
        if row.can_view_all && !row.can_read {
            tracing::warn!(
                profile_id = %row.profile_id,
                object_type = %row.object_type,
                "catalog row has view-all without read; it will be demoted at load"
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(object_type: &str, read: bool, view_all: bool) -> db::profiles::ObjectPermissionRow {
        db::profiles::ObjectPermissionRow {
            profile_id: "p1".to_string(),
            object_type: object_type.to_string(),
            can_read: read,
            can_create: false,
            can_edit: false,
            can_delete: false,
            can_view_all: view_all,
        }
    }

    #[test]
    fn missing_row_denies() {
        let grants = ProfileGrants::from_rows(&[row("property", true, false)]);
        assert!(grants.allows(ObjectType::Property, ObjectAction::Read));
        assert!(!grants.allows(ObjectType::Lease, ObjectAction::Read));
    }

    #[test]
    fn flags_map_to_actions() {
        let rows = [db::profiles::ObjectPermissionRow {
            profile_id: "p1".to_string(),
            object_type: "unit".to_string(),
            can_read: true,
            can_create: true,
            can_edit: false,
            can_delete: false,
            can_view_all: false,
        }];
        let grants = ProfileGrants::from_rows(&rows);
        assert!(grants.allows(ObjectType::Unit, ObjectAction::Create));
        assert!(!grants.allows(ObjectType::Unit, ObjectAction::Edit));
        assert!(!grants.allows(ObjectType::Unit, ObjectAction::Delete));
    }

    #[test]
    fn view_all_without_read_is_demoted() {
        let grants = ProfileGrants::from_rows(&[row("property", false, true)]);
        let grant = grants.grant(ObjectType::Property).unwrap();
        assert!(!grant.can_view_all);
        assert!(!grant.can_read);
    }

    #[test]
    fn view_all_with_read_survives() {
        let grants = ProfileGrants::from_rows(&[row("property", true, true)]);
        let grant = grants.grant(ObjectType::Property).unwrap();
        assert!(grant.can_view_all);
    }

    #[test]
    fn unknown_object_type_rows_are_skipped() {
        let grants = ProfileGrants::from_rows(&[row("spaceship", true, false)]);
        assert!(!grants.allows(ObjectType::Property, ObjectAction::Read));
    }
}
