use std::collections::HashSet;

use sqlx::SqlitePool;

use super::{ModelResult, User};

impl User {
    /// Records that `self` follows `other`. Following twice is a no-op.
    pub async fn follow(&self, db_pool: &SqlitePool, other: &User) -> ModelResult<()> {
        sqlx::query(
            "INSERT INTO follows (user_being_followed_id, user_following_id) VALUES (?, ?)
             ON CONFLICT DO NOTHING",
        )
        .bind(other.id)
        .bind(self.id)
        .execute(db_pool)
        .await?;
        Ok(())
    }

    pub async fn unfollow(&self, db_pool: &SqlitePool, other: &User) -> ModelResult<()> {
        sqlx::query("DELETE FROM follows WHERE user_being_followed_id=? AND user_following_id=?")
            .bind(other.id)
            .bind(self.id)
            .execute(db_pool)
            .await?;
        Ok(())
    }

    pub async fn is_following(&self, db_pool: &SqlitePool, other: &User) -> ModelResult<bool> {
        follows_exists(db_pool, self.id, other.id).await
    }

    pub async fn is_followed_by(&self, db_pool: &SqlitePool, other: &User) -> ModelResult<bool> {
        follows_exists(db_pool, other.id, self.id).await
    }

    /// Users `self` follows.
    pub async fn following(&self, db_pool: &SqlitePool) -> ModelResult<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT u.* FROM users u JOIN follows f ON f.user_being_followed_id = u.id
             WHERE f.user_following_id=? ORDER BY u.id",
        )
        .bind(self.id)
        .fetch_all(db_pool)
        .await?;
        Ok(users)
    }

    /// Users following `self`.
    pub async fn followers(&self, db_pool: &SqlitePool) -> ModelResult<Vec<User>> {
        let users = sqlx::query_as(
            "SELECT u.* FROM users u JOIN follows f ON f.user_following_id = u.id
             WHERE f.user_being_followed_id=? ORDER BY u.id",
        )
        .bind(self.id)
        .fetch_all(db_pool)
        .await?;
        Ok(users)
    }

    pub async fn following_ids(&self, db_pool: &SqlitePool) -> ModelResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT user_being_followed_id FROM follows WHERE user_following_id=?")
            .bind(self.id)
            .fetch_all(db_pool)
            .await?;
        Ok(ids.into_iter().collect())
    }
}

async fn follows_exists(db_pool: &SqlitePool, follower_id: i64, followed_id: i64) -> ModelResult<bool> {
    Ok(
        sqlx::query("SELECT 1 FROM follows WHERE user_following_id=? AND user_being_followed_id=?")
            .bind(follower_id)
            .bind(followed_id)
            .fetch_optional(db_pool)
            .await?
            .is_some()
    )
}
