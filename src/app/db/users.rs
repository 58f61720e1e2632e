use sqlx::FromRow;
use time::OffsetDateTime;

use crate::app::domain::{Email, HashedPassword, OrganizationId, ProfileId, UserId};

/// Database row for users table.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub organization_id: Option<String>,
    pub profile_id: Option<String>,
    pub is_super_admin: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new user. New accounts start with no
/// organization; the setup wizard links one later.
pub struct NewUser {
    pub id: UserId,
    pub email: Email,
    pub password_hash: HashedPassword,
    pub is_super_admin: bool,
}

/// Find a user by email address.
pub async fn find_by_email(
    pool: &sqlx::SqlitePool,
    email: &Email,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email.as_str())
        .fetch_optional(pool)
        .await
}

/// Find a user by ID.
pub async fn find_by_id<'e, E>(executor: E, user_id: &UserId) -> Result<Option<User>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Insert a new user.
pub async fn insert<'e, E>(executor: E, user: &NewUser) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO users (id, email, password_hash, is_super_admin, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id.as_str())
    .bind(user.email.as_str())
    .bind(user.password_hash.as_str())
    .bind(user.is_super_admin)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Attach a user to an organization with the given profile. Runs when the
/// setup wizard creates the organization.
pub async fn assign_organization<'e, E>(
    executor: E,
    user_id: &UserId,
    organization_id: &OrganizationId,
    profile_id: &ProfileId,
) -> Result<(), sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE users SET organization_id = ?, profile_id = ?, updated_at = ? WHERE id = ?")
        .bind(organization_id.as_str())
        .bind(profile_id.as_str())
        .bind(now)
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
