mod like;
mod msg;
mod new;
mod show;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub(crate) use msg::warbles_to_html;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/messages/new", get(new::new_message_page).post(new::new_message))
        .route("/messages/{message_id}", get(show::show_message))
        .route("/messages/{message_id}/delete", post(show::delete_message))
        .route("/messages/{message_id}/like", post(like::like_message))
}
