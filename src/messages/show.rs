use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    include_res,
    models::Message,
    res::{self, fill},
    session, AppResult,
};

use super::msg;

#[debug_handler]
pub(crate) async fn show_message(
    Path(message_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(warble) = Message::get_warble(&db_pool, message_id).await? else {
        return res::sorry("message");
    };

    let viewer = session::current_user(&db_pool, &session).await?;
    let liked = match &viewer {
        Some(viewer) => viewer.liked_message_ids(&db_pool).await?,
        None => Default::default(),
    };

    let actions = match &viewer {
        Some(viewer) if viewer.id == warble.user_id => fill(
            include_res!(str, "/pages/messages/delete_button.html"),
            &[("id", &warble.id.to_string())],
        ),
        _ => String::new(),
    };

    let content = fill(
        include_res!(str, "/pages/messages/show.html"),
        &[
            ("message", &msg::warble_to_html(&warble, viewer.as_ref(), &liked)),
            ("actions", &actions),
        ],
    );
    res::page(&session, viewer.as_ref(), "Message", &content).await
}

#[debug_handler]
pub(crate) async fn delete_message(
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

    if message.user_id != user.id {
        return res::unauthorized(&session).await;
    }

    message.delete(&db_pool).await?;
    info!("@{} deleted message #{}", user.username, message.id);

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}
