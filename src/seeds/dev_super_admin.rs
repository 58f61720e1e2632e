use std::env;

use async_trait::async_trait;
use rand::prelude::{IndexedRandom, SliceRandom};
use sqlx::SqlitePool;

use crate::app::db;
use crate::app::domain::{Email, HashedPassword, Password, UserId};
use crate::seeds::{Seed, SeedOutcome};

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGIT: &[u8] = b"0123456789";

fn random_password() -> String {
    let mut rng = rand::rng();
    let mut chars: Vec<char> = vec![
        *UPPER.choose(&mut rng).unwrap() as char,
        *LOWER.choose(&mut rng).unwrap() as char,
        *DIGIT.choose(&mut rng).unwrap() as char,
    ];
    let pool: Vec<u8> = UPPER.iter().chain(LOWER).chain(DIGIT).copied().collect();
    for _ in 0..12 {
        chars.push(*pool.choose(&mut rng).unwrap() as char);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

/// Creates the platform operator account when SEED_SUPER_ADMIN_EMAIL is set.
/// The generated password is printed once; change it after first sign-in.
pub struct DevSuperAdmin;

#[async_trait]
impl Seed for DevSuperAdmin {
    fn version(&self) -> i64 {
        20260601091000
    }

    fn description(&self) -> &str {
        "dev_super_admin"
    }

    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, sqlx::Error> {
        let email_str = match env::var("SEED_SUPER_ADMIN_EMAIL") {
            Ok(s) if !s.trim().is_empty() => s.trim().to_lowercase(),
            _ => return Ok(SeedOutcome::Skipped),
        };
        let email = match Email::new(email_str) {
            Ok(e) => e,
            Err(_) => return Ok(SeedOutcome::Skipped),
        };
        if db::find_by_email(pool, &email).await?.is_some() {
            return Ok(SeedOutcome::Applied);
        }

        let plaintext = random_password();
        let password = Password::new(plaintext.clone())
            .expect("random password meets strength requirements");
        let password_hash =
            HashedPassword::from_password(&password).expect("password hashing must succeed");

        let user = db::NewUser {
            id: UserId::new(),
            email: email.clone(),
            password_hash,
            is_super_admin: true,
        };
        db::users::insert(pool, &user).await?;

        eprintln!(
            "Created super admin {} with a generated password shown once below.",
            email.as_str()
        );
        eprintln!("Password: {}", plaintext);

        Ok(SeedOutcome::Applied)
    }
}
