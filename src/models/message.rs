use std::fmt;

use chrono::NaiveDateTime;
use sqlx::{FromRow, SqlitePool};

use super::ModelResult;

pub const MAX_MESSAGE_LEN: usize = 140;

const TIMELINE_LIMIT: i64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i64,
}

/// An unsaved message row; the database rejects it without text or owner.
#[derive(Debug, Default, Clone)]
pub struct NewMessage {
    pub text: Option<String>,
    pub user_id: Option<i64>,
}

/// A message joined with its author, the shape every message list renders.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Warble {
    pub id: i64,
    pub text: String,
    pub timestamp: NaiveDateTime,
    pub user_id: i64,
    pub username: String,
    pub image_url: Option<String>,
}

impl Message {
    pub async fn create(db_pool: &SqlitePool, new_message: &NewMessage) -> ModelResult<Message> {
        let message = sqlx::query_as("INSERT INTO messages (text, user_id) VALUES (?, ?) RETURNING *")
            .bind(&new_message.text)
            .bind(new_message.user_id)
            .fetch_one(db_pool)
            .await?;
        Ok(message)
    }

    pub async fn get(db_pool: &SqlitePool, id: i64) -> ModelResult<Option<Message>> {
        let message = sqlx::query_as("SELECT * FROM messages WHERE id=?")
            .bind(id)
            .fetch_optional(db_pool)
            .await?;
        Ok(message)
    }

    pub async fn delete(&self, db_pool: &SqlitePool) -> ModelResult<()> {
        sqlx::query("DELETE FROM messages WHERE id=?")
            .bind(self.id)
            .execute(db_pool)
            .await?;
        Ok(())
    }

    pub async fn get_warble(db_pool: &SqlitePool, id: i64) -> ModelResult<Option<Warble>> {
        let warble = sqlx::query_as(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
             FROM messages m JOIN users u ON u.id = m.user_id
             WHERE m.id=?",
        )
        .bind(id)
        .fetch_optional(db_pool)
        .await?;
        Ok(warble)
    }

    /// Newest messages written by one user.
    pub async fn by_user(db_pool: &SqlitePool, user_id: i64) -> ModelResult<Vec<Warble>> {
        let warbles = sqlx::query_as(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
             FROM messages m JOIN users u ON u.id = m.user_id
             WHERE m.user_id=?
             ORDER BY m.timestamp DESC, m.id DESC
             LIMIT ?",
        )
        .bind(user_id)
        .bind(TIMELINE_LIMIT)
        .fetch_all(db_pool)
        .await?;
        Ok(warbles)
    }

    /// Newest messages by the user and everyone they follow.
    pub async fn timeline(db_pool: &SqlitePool, user_id: i64) -> ModelResult<Vec<Warble>> {
        let warbles = sqlx::query_as(
            "SELECT m.id, m.text, m.timestamp, m.user_id, u.username, u.image_url
             FROM messages m JOIN users u ON u.id = m.user_id
             WHERE m.user_id=?1
                OR m.user_id IN (SELECT user_being_followed_id FROM follows WHERE user_following_id=?1)
             ORDER BY m.timestamp DESC, m.id DESC
             LIMIT ?2",
        )
        .bind(user_id)
        .bind(TIMELINE_LIMIT)
        .fetch_all(db_pool)
        .await?;
        Ok(warbles)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<Message #{}: {} | User {} | {}>", self.id, self.text, self.user_id, self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::User,
        testing::{memory_pool, plain_user},
    };

    async fn post(db_pool: &SqlitePool, user_id: i64, text: &str) -> Message {
        Message::create(
            db_pool,
            &NewMessage {
                text: Some(text.to_owned()),
                user_id: Some(user_id),
            },
        )
        .await
        .unwrap()
    }

    async fn message_count(db_pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(db_pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_stores_text_owner_and_timestamp() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;

        let message = post(&db_pool, user.id, "Test Message Content").await;

        assert!(message.id > 0);
        assert_eq!(message.text, "Test Message Content");
        assert_eq!(message.user_id, user.id);
        let age = chrono::Utc::now().naive_utc() - message.timestamp;
        assert!(age.num_minutes().abs() < 5);
        assert_eq!(Message::get(&db_pool, message.id).await.unwrap(), Some(message));
    }

    #[tokio::test]
    async fn display_names_id_text_owner_and_timestamp() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;
        let message = post(&db_pool, user.id, "Test Message Content").await;

        assert_eq!(
            message.to_string(),
            format!(
                "<Message #{}: Test Message Content | User {} | {}>",
                message.id, user.id, message.timestamp
            )
        );
    }

    #[tokio::test]
    async fn message_without_text_is_rejected() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;

        let err = Message::create(&db_pool, &NewMessage { text: None, user_id: Some(user.id) })
            .await
            .unwrap_err();

        assert!(err.is_integrity());
        assert_eq!(message_count(&db_pool).await, 0);
    }

    #[tokio::test]
    async fn message_without_owner_is_rejected() {
        let db_pool = memory_pool().await;

        let err = Message::create(
            &db_pool,
            &NewMessage {
                text: Some("Test Message Content".to_owned()),
                user_id: None,
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_integrity());
        assert_eq!(message_count(&db_pool).await, 0);
    }

    #[tokio::test]
    async fn message_with_unknown_owner_is_rejected() {
        let db_pool = memory_pool().await;

        let err = Message::create(
            &db_pool,
            &NewMessage {
                text: Some("Test Message Content".to_owned()),
                user_id: Some(9999),
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_integrity());
        assert_eq!(message_count(&db_pool).await, 0);
    }

    #[tokio::test]
    async fn overlong_message_is_rejected() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;

        let err = Message::create(
            &db_pool,
            &NewMessage {
                text: Some("x".repeat(MAX_MESSAGE_LEN + 1)),
                user_id: Some(user.id),
            },
        )
        .await
        .unwrap_err();

        assert!(err.is_integrity());
    }

    #[tokio::test]
    async fn deleting_owner_deletes_their_messages() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;
        let other = plain_user(&db_pool, "other", "other@test.com").await;
        let message = post(&db_pool, user.id, "Test Message Content").await;
        let kept = post(&db_pool, other.id, "still here").await;

        User::get(&db_pool, user.id).await.unwrap().unwrap().delete(&db_pool).await.unwrap();

        assert!(Message::get(&db_pool, message.id).await.unwrap().is_none());
        assert!(Message::get(&db_pool, kept.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn timeline_covers_self_and_followed_users_newest_first() {
        let db_pool = memory_pool().await;
        let me = plain_user(&db_pool, "me", "me@test.com").await;
        let friend = plain_user(&db_pool, "friend", "friend@test.com").await;
        let stranger = plain_user(&db_pool, "stranger", "stranger@test.com").await;
        me.follow(&db_pool, &friend).await.unwrap();

        post(&db_pool, me.id, "mine").await;
        post(&db_pool, friend.id, "friend's").await;
        post(&db_pool, stranger.id, "stranger's").await;

        let texts: Vec<String> = Message::timeline(&db_pool, me.id)
            .await
            .unwrap()
            .into_iter()
            .map(|w| w.text)
            .collect();
        assert_eq!(texts, ["friend's", "mine"]);
    }

    #[tokio::test]
    async fn warble_carries_author() {
        let db_pool = memory_pool().await;
        let user = plain_user(&db_pool, "testuser", "test@test.com").await;
        let message = post(&db_pool, user.id, "hi").await;

        let warble = Message::get_warble(&db_pool, message.id).await.unwrap().unwrap();
        assert_eq!(warble.username, "testuser");
        assert_eq!(warble.user_id, user.id);
    }
}
