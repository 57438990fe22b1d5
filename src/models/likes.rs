use std::collections::HashSet;

use sqlx::SqlitePool;

use super::{ModelResult, User, Warble};

/// Likes the message if it isn't liked yet, otherwise takes the like back.
/// Returns whether the message is liked afterwards.
pub async fn toggle_like(db_pool: &SqlitePool, user_id: i64, message_id: i64) -> ModelResult<bool> {
    let removed = sqlx::query("DELETE FROM likes WHERE user_id=? AND message_id=?")
        .bind(user_id)
        .bind(message_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if removed > 0 {
        return Ok(false);
    }

    // a concurrent toggle may have inserted the edge in between
    sqlx::query("INSERT INTO likes (user_id, message_id) VALUES (?, ?) ON CONFLICT DO NOTHING")
        .bind(user_id)
        .bind(message_id)
        .execute(db_pool)
        .await?;
    Ok(true)
}

impl User {
    /// Messages `self` has liked, newest first.
    pub async fn likes(&self, db_pool: &SqlitePool) -> ModelResult<Vec<Warble>> {
        let warbles = sqlx::query_as(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
             FROM likes l
             JOIN messages m ON m.id = l.message_id
             JOIN users u ON u.id = m.user_id
             WHERE l.user_id=?
             ORDER BY m.timestamp DESC, m.id DESC",
        )
        .bind(self.id)
        .fetch_all(db_pool)
        .await?;
        Ok(warbles)
    }

    pub async fn liked_message_ids(&self, db_pool: &SqlitePool) -> ModelResult<HashSet<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT message_id FROM likes WHERE user_id=?")
            .bind(self.id)
            .fetch_all(db_pool)
            .await?;
        Ok(ids.into_iter().collect())
    }
}
