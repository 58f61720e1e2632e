use async_trait::async_trait;
use sqlx::SqlitePool;
use strum::IntoEnumIterator;

use crate::app::db;
use crate::app::domain::{ObjectType, ProfileId};
use crate::seeds::{Seed, SeedOutcome};

/// Capability flags for one object type: (read, create, edit, delete, view_all).
type Flags = (bool, bool, bool, bool, bool);

const FULL: Flags = (true, true, true, true, true);
const NONE: Flags = (false, false, false, false, false);

fn manager_flags(object_type: ObjectType) -> Flags {
    match object_type {
        // Managers run the portfolio but cannot administer the organization.
        ObjectType::Organization => (true, false, false, false, false),
        _ => FULL,
    }
}

fn agent_flags(object_type: ObjectType) -> Flags {
    match object_type {
        ObjectType::Property | ObjectType::Unit | ObjectType::Tenant => {
            (true, true, false, false, false)
        }
        ObjectType::Lease | ObjectType::Payment | ObjectType::Document => {
            (true, false, false, false, false)
        }
        ObjectType::Organization | ObjectType::Report => NONE,
    }
}

fn viewer_flags(object_type: ObjectType) -> Flags {
    match object_type {
        ObjectType::Organization => NONE,
        _ => (true, false, false, false, false),
    }
}

pub struct SystemProfiles;

impl SystemProfiles {
    async fn seed_profile(
        pool: &SqlitePool,
        name: &str,
        flags_for: fn(ObjectType) -> Flags,
    ) -> Result<(), sqlx::Error> {
        if db::profiles::find_system_by_name(pool, name).await?.is_some() {
            return Ok(());
        }
        let profile = db::profiles::NewProfile {
            id: ProfileId::new(),
            name: name.to_string(),
            organization_id: None,
        };
        db::profiles::insert(pool, &profile).await?;
        for object_type in ObjectType::iter() {
            let (read, create, edit, delete, view_all) = flags_for(object_type);
            if !(read || create || edit || delete || view_all) {
                continue;
            }
            db::profiles::insert_permission(
                pool, &profile.id, object_type, read, create, edit, delete, view_all,
            )
            .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Seed for SystemProfiles {
    fn version(&self) -> i64 {
        20260601090500
    }

    fn description(&self) -> &str {
        "system_profiles"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, sqlx::Error> {
        Self::seed_profile(pool, db::profiles::SYSTEM_ADMINISTRATOR, |_| FULL).await?;
        Self::seed_profile(pool, "Manager", manager_flags).await?;
        Self::seed_profile(pool, "Agent", agent_flags).await?;
        Self::seed_profile(pool, "Viewer", viewer_flags).await?;
        Ok(SeedOutcome::Applied)
    }
}
