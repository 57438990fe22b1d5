use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    include_res,
    models::{Message, NewMessage, User, MAX_MESSAGE_LEN},
    res::{self, escape, fill},
    session, AppResult,
};

#[derive(Debug, Deserialize)]
pub(crate) struct NewMessageForm {
    #[serde(default)]
    text: String,
}

#[debug_handler]
pub(crate) async fn new_message_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    new_message_form(&session, &user, "", None).await
}

#[debug_handler]
pub(crate) async fn new_message(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(NewMessageForm { text }): Form<NewMessageForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return new_message_form(&session, &user, &text, Some("Message text is required.")).await;
    }
    if trimmed.chars().count() > MAX_MESSAGE_LEN {
        let error = format!("Messages can be at most {MAX_MESSAGE_LEN} characters.");
        return new_message_form(&session, &user, &text, Some(&error)).await;
    }

    let message = Message::create(
        &db_pool,
        &NewMessage {
            text: Some(trimmed.to_owned()),
            user_id: Some(user.id),
        },
    )
    .await?;
    info!("@{} posted message #{}", user.username, message.id);

    Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
}

async fn new_message_form(session: &Session, user: &User, text: &str, error: Option<&str>) -> AppResult<Response> {
    let errors = error.map(|e| res::alert("danger", e)).unwrap_or_default();
    let content = fill(
        include_res!(str, "/pages/messages/new.html"),
        &[("errors", &errors), ("text", &escape(text))],
    );
    res::page(session, Some(user), "New message", &content).await
}
