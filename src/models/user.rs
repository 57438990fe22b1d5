use std::fmt;

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use super::{ModelError, ModelResult};

pub const DEFAULT_IMAGE_URL: &str = "/static/images/default-pic.svg";
pub const DEFAULT_HEADER_IMAGE_URL: &str = "/static/images/warbler-hero.svg";

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
    /// Argon2 PHC string.
    pub password: String,
}

/// An unsaved user row. Required columns are optional here because the
/// database, not this struct, is what rejects a row missing them.
#[derive(Debug, Default, Clone)]
pub struct NewUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    pub image_url: Option<String>,
    pub header_image_url: Option<String>,
    pub bio: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct UserStats {
    pub messages: i64,
    pub following: i64,
    pub followers: i64,
    pub likes: i64,
}

impl User {
    /// Hashes the password and stores the user.
    pub async fn signup(db_pool: &SqlitePool, mut new_user: NewUser) -> ModelResult<User> {
        if let Some(password) = new_user.password.take() {
            new_user.password = Some(hash_password(&password)?);
        }
        let user = Self::create(db_pool, &new_user).await?;
        debug!("signed up {user}");
        Ok(user)
    }

    /// Stores the row as given; `password` must already be hashed.
    pub async fn create(db_pool: &SqlitePool, new_user: &NewUser) -> ModelResult<User> {
        let user = sqlx::query_as(
            "INSERT INTO users (email, username, password, image_url) VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.password)
        .bind(&new_user.image_url)
        .fetch_one(db_pool)
        .await?;
        Ok(user)
    }

    /// The user whose username and password match, or `None` for an unknown
    /// username and a wrong password alike.
    pub async fn authenticate(db_pool: &SqlitePool, username: &str, password: &str) -> ModelResult<Option<User>> {
        let Some(user) = Self::get_by_username(db_pool, username).await? else {
            return Ok(None);
        };

        let Ok(parsed_hash) = PasswordHash::new(&user.password) else {
            warn!("stored password for @{} is not a valid hash", user.username);
            return Ok(None);
        };

        let verified = Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        Ok(verified.then_some(user))
    }

    pub async fn get(db_pool: &SqlitePool, id: i64) -> ModelResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE id=?")
            .bind(id)
            .fetch_optional(db_pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_username(db_pool: &SqlitePool, username: &str) -> ModelResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE username=?")
            .bind(username)
            .fetch_optional(db_pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_email(db_pool: &SqlitePool, email: &str) -> ModelResult<Option<User>> {
        let user = sqlx::query_as("SELECT * FROM users WHERE email=?")
            .bind(email)
            .fetch_optional(db_pool)
            .await?;
        Ok(user)
    }

    pub async fn all(db_pool: &SqlitePool) -> ModelResult<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(db_pool)
            .await?;
        Ok(users)
    }

    /// Users whose username contains `q`.
    pub async fn search(db_pool: &SqlitePool, q: &str) -> ModelResult<Vec<User>> {
        let users = sqlx::query_as("SELECT * FROM users WHERE instr(username, ?) > 0 ORDER BY id")
            .bind(q)
            .fetch_all(db_pool)
            .await?;
        Ok(users)
    }

    pub async fn update_profile(&self, db_pool: &SqlitePool, update: &ProfileUpdate) -> ModelResult<User> {
        let user = sqlx::query_as(
            "UPDATE users SET username=?, email=?, image_url=?, header_image_url=?, bio=?, location=? WHERE id=? RETURNING *",
        )
        .bind(&update.username)
        .bind(&update.email)
        .bind(&update.image_url)
        .bind(&update.header_image_url)
        .bind(&update.bio)
        .bind(&update.location)
        .bind(self.id)
        .fetch_one(db_pool)
        .await?;
        Ok(user)
    }

    /// Removes the user along with their messages, follows and likes.
    pub async fn delete(&self, db_pool: &SqlitePool) -> ModelResult<()> {
        sqlx::query("DELETE FROM users WHERE id=?")
            .bind(self.id)
            .execute(db_pool)
            .await?;
        Ok(())
    }

    pub async fn stats(&self, db_pool: &SqlitePool) -> ModelResult<UserStats> {
        let stats = sqlx::query_as(
            "SELECT
                (SELECT COUNT(*) FROM messages WHERE user_id=?1) AS messages,
                (SELECT COUNT(*) FROM follows WHERE user_following_id=?1) AS following,
                (SELECT COUNT(*) FROM follows WHERE user_being_followed_id=?1) AS followers,
                (SELECT COUNT(*) FROM likes WHERE user_id=?1) AS likes",
        )
        .bind(self.id)
        .fetch_one(db_pool)
        .await?;
        Ok(stats)
    }

    pub fn image_url(&self) -> &str {
        self.image_url.as_deref().unwrap_or(DEFAULT_IMAGE_URL)
    }

    pub fn header_image_url(&self) -> &str {
        self.header_image_url.as_deref().unwrap_or(DEFAULT_HEADER_IMAGE_URL)
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<User #{}: {}, {}>", self.id, self.username, self.email)
    }
}

fn hash_password(password: &str) -> ModelResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(ModelError::PasswordHash)?;
    Ok(hash.to_string())
}
