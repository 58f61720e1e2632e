use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{ObjectType, OrganizationId, ProfileId};

/// Reserved name of the system administrator profile template.
pub const SYSTEM_ADMINISTRATOR: &str = "System Administrator";

/// Database row for profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub organization_id: Option<String>,
    pub created_at: i64,
}

/// Database row for object_permissions table. `object_type` is stored as
/// text and parsed into the closed enum by the catalog.
#[derive(Debug, Clone, FromRow)]
pub struct ObjectPermissionRow {
    pub profile_id: String,
    pub object_type: String,
    pub can_read: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_view_all: bool,
}

/// Data structure for inserting a new profile.
pub struct NewProfile {
    pub id: ProfileId,
    pub name: String,
    pub organization_id: Option<OrganizationId>,
}

/// Find a profile by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    profile_id: &ProfileId,
) -> Result<Option<Profile>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = ?")
        .bind(profile_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Find a system profile template (organization_id IS NULL) by name.
pub async fn find_system_by_name<'e, E>(
    executor: E,
    name: &str,
) -> Result<Option<Profile>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Profile>(
        "SELECT * FROM profiles WHERE name = ? AND organization_id IS NULL",
    )
    .bind(name)
    .fetch_optional(executor)
    .await
}

/// Insert a new profile.
pub async fn insert<'e, E>(executor: E, profile: &NewProfile) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("INSERT INTO profiles (id, name, organization_id, created_at) VALUES (?, ?, ?, ?)")
        .bind(profile.id.as_str())
        .bind(&profile.name)
        .bind(profile.organization_id.as_ref().map(|o| o.as_str()))
        .bind(now)
        .execute(executor)
        .await?;
    Ok(())
}

/// List the permission rows owned by a profile.
pub async fn list_permissions<'e, E>(
    executor: E,
    profile_id: &ProfileId,
) -> Result<Vec<ObjectPermissionRow>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ObjectPermissionRow>(
        "SELECT * FROM object_permissions WHERE profile_id = ?",
    )
    .bind(profile_id.as_str())
    .fetch_all(executor)
    .await
}

/// List every permission row in the catalog. Used by startup validation.
pub async fn list_all_permissions(
    pool: &sqlx::SqlitePool,
) -> Result<Vec<ObjectPermissionRow>, sqlx::Error> {
    sqlx::query_as::<_, ObjectPermissionRow>("SELECT * FROM object_permissions")
        .fetch_all(pool)
        .await
}

/// Insert a permission row for a profile. One row per (profile, object type).
pub async fn insert_permission<'e, E>(
    executor: E,
    profile_id: &ProfileId,
    object_type: ObjectType,
    can_read: bool,
    can_create: bool,
    can_edit: bool,
    can_delete: bool,
    can_view_all: bool,
) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO object_permissions \
         (profile_id, object_type, can_read, can_create, can_edit, can_delete, can_view_all) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(profile_id.as_str())
    .bind(object_type.to_string())
    .bind(can_read)
    .bind(can_create)
    .bind(can_edit)
    .bind(can_delete)
    .bind(can_view_all)
    .execute(executor)
    .await?;
    Ok(())
}
