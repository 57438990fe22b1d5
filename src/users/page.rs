use axum::{debug_handler, extract::{Path, State}, response::Response};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res,
    messages::warbles_to_html,
    models::{Message, User},
    res::{self, fill},
    session, AppResult,
};

use super::user_detail;

#[debug_handler]
pub(crate) async fn show_user(
    Path(user_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = User::get(&db_pool, user_id).await? else {
        return res::sorry("user");
    };

    let viewer = session::current_user(&db_pool, &session).await?;
    let liked = match &viewer {
        Some(viewer) => viewer.liked_message_ids(&db_pool).await?,
        None => Default::default(),
    };

    let warbles = Message::by_user(&db_pool, user.id).await?;
    let body = fill(
        include_res!(str, "/pages/users/messages.html"),
        &[("messages", &warbles_to_html(&warbles, viewer.as_ref(), &liked))],
    );

    user_detail(&db_pool, &session, viewer.as_ref(), &user, &format!("@{}", user.username), &body).await
}
