use sqlx::SqlitePool;
use time::Duration;

use crate::app::{
    db,
    domain::{Email, HashedPassword, Password, UserId},
    error::AppError,
};

/// Sign up a new user. Returns the session ID on success. New accounts have
/// no organization yet; the gate funnels them into the setup wizard.
pub async fn signup(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
) -> Result<String, AppError> {
    if db::find_by_email(pool, email).await?.is_some() {
        return Err(AppError::Auth(
            "Unable to create account. If you already have an account, please log in.".to_string(),
        ));
    }

    let password_hash = HashedPassword::from_password(password).map_err(|_| AppError::Internal)?;
    let user_id = UserId::new();

    let new_user = db::NewUser {
        id: user_id,
        email: email.clone(),
        password_hash,
        is_super_admin: false,
    };

    let mut tx = pool.begin().await?;
    db::users::insert(&mut *tx, &new_user).await?;

    // Create session (30 days)
    let expires_at = time::OffsetDateTime::now_utc() + Duration::days(30);
    let session_id = db::sessions::create(&mut *tx, &new_user.id, expires_at).await?;
    tx.commit().await?;

    Ok(session_id)
}

/// Log in a user. Returns the session ID on success.
pub async fn login(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
) -> Result<String, AppError> {
    let user = db::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::Auth("Invalid email or password".to_string()))?;

    let stored_hash = HashedPassword::from_string(user.password_hash);
    stored_hash
        .verify(password)
        .map_err(|_| AppError::Auth("Invalid email or password".to_string()))?;

    let user_id = UserId::from_string(&user.id).map_err(|_| AppError::Internal)?;

    // Create session (30 days)
    let expires_at = time::OffsetDateTime::now_utc() + Duration::days(30);
    let session_id = db::sessions::create(pool, &user_id, expires_at).await?;

    Ok(session_id)
}
