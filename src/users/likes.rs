use axum::{debug_handler, extract::{Path, State}, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res,
    messages::warbles_to_html,
    models::User,
    res::{self, escape, fill},
    session, AppResult,
};

use super::user_detail;

#[debug_handler]
pub(crate) async fn show_likes(
    Path(user_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(viewer) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    let Some(user) = User::get(&db_pool, user_id).await? else {
        return res::sorry("user");
    };

    let warbles = user.likes(&db_pool).await?;
    let liked = viewer.liked_message_ids(&db_pool).await?;
    let body = fill(
        include_res!(str, "/pages/users/likes.html"),
        &[
            ("heading", &escape(&format!("Liked by @{}:", user.username))),
            ("messages", &warbles_to_html(&warbles, Some(&viewer), &liked)),
        ],
    );

    user_detail(&db_pool, &session, Some(&viewer), &user, "Likes", &body).await
}

#[cfg(test)]
mod tests {
    use crate::testing::{memory_pool, signup, TestClient};

    #[tokio::test]
    async fn own_likes_page() {
        let db_pool = memory_pool().await;
        let user1 = signup(&db_pool, "user1", "user1@test1.com", "password").await;
        let mut client = TestClient::new(db_pool);
        client.login("user1", "password").await;

        let resp = client.get(&format!("/users/{}/likes", user1.id)).await;
        assert!(resp.body.contains("Liked by @user1:"));
    }

    #[tokio::test]
    async fn other_users_likes_page() {
        let db_pool = memory_pool().await;
        signup(&db_pool, "user1", "user1@test1.com", "password").await;
        let user2 = signup(&db_pool, "user2", "user2@test2.com", "password").await;
        let mut client = TestClient::new(db_pool);
        client.login("user1", "password").await;

        let resp = client.get(&format!("/users/{}/likes", user2.id)).await;
        assert!(resp.body.contains("Liked by @user2:"));
    }
}
