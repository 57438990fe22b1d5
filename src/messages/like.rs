use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::debug;

use crate::{
    models::{toggle_like, Message},
    res, session, AppResult,
};

/// Likes the message for the logged-in user, or takes the like back.
#[debug_handler]
pub(crate) async fn like_message(
    Path(message_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    let Some(message) = Message::get(&db_pool, message_id).await? else {
        return res::sorry("message");
    };

    if message.user_id == user.id {
        return res::unauthorized(&session).await;
    }

    let liked = toggle_like(&db_pool, user.id, message.id).await?;
    debug!("@{} liked={liked} message #{}", user.username, message.id);

    Ok(Redirect::to("/").into_response())
}
