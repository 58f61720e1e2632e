use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{OrganizationId, Subdomain};

/// Database row for organizations table.
#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub subdomain: Option<String>,
    pub country: String,
    pub is_configured: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new organization. Organizations start
/// unconfigured; `mark_configured` flips the flag when the wizard finishes.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub subdomain: Option<Subdomain>,
    pub country: String,
}

/// Find an organization by ID.
pub async fn find_by_id<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ?")
        .bind(organization_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Find an organization by its tenant subdomain. Exact match only.
pub async fn find_by_subdomain<'e, E>(
    executor: E,
    subdomain: &str,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE subdomain = ?")
        .bind(subdomain)
        .fetch_optional(executor)
        .await
}

/// List all organizations, newest first. Used by the platform admin area.
pub async fn list_all(pool: &sqlx::SqlitePool) -> Result<Vec<Organization>, sqlx::Error> {
    sqlx::query_as::<_, Organization>("SELECT * FROM organizations ORDER BY created_at DESC")
        .fetch_all(pool)
        .await
}

/// Insert a new organization.
pub async fn insert<'e, E>(executor: E, organization: &NewOrganization) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, name, subdomain, country, is_configured, created_at, updated_at) \
         VALUES (?, ?, ?, ?, 0, ?, ?)",
    )
    .bind(organization.id.as_str())
    .bind(&organization.name)
    .bind(organization.subdomain.as_ref().map(|s| s.as_str().to_string()))
    .bind(&organization.country)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Mark an organization as configured. Flips exactly once; repeated calls are
/// harmless no-ops at the SQL level.
pub async fn mark_configured<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE organizations SET is_configured = 1, updated_at = ? WHERE id = ?")
        .bind(now)
        .bind(organization_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
