use axum::{debug_handler, extract::State, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res,
    messages::warbles_to_html,
    models::Message,
    res::{self, escape, fill},
    session, AppResult,
};

/// Landing page for visitors; the timeline for a logged-in user.
#[debug_handler]
pub async fn index(
    State(db_pool): State<SqlitePool>,
    session: Session
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::page(&session, None, "Warbler", include_res!(str, "/pages/home_anon.html")).await;
    };

    let warbles = Message::timeline(&db_pool, user.id).await?;
    let liked = user.liked_message_ids(&db_pool).await?;
    let stats = user.stats(&db_pool).await?;

    let content = fill(
        include_res!(str, "/pages/home.html"),
        &[
            ("id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("image_url", &escape(user.image_url())),
            ("header_image_url", &escape(user.header_image_url())),
            ("messages_count", &stats.messages.to_string()),
            ("following_count", &stats.following.to_string()),
            ("followers_count", &stats.followers.to_string()),
            ("likes_count", &stats.likes.to_string()),
            ("messages", &warbles_to_html(&warbles, Some(&user), &liked)),
        ],
    );
    res::page(&session, Some(&user), "Warbler", &content).await
}
