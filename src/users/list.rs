use axum::{debug_handler, extract::{Query, State}, response::Response};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res,
    models::User,
    res::{self, fill},
    session, AppResult,
};

use super::user_cards;

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    q: Option<String>,
}

#[debug_handler]
pub(crate) async fn list_users(
    Query(ListQuery { q }): Query<ListQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let users = match q.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => User::search(&db_pool, q).await?,
        _ => User::all(&db_pool).await?,
    };

    let viewer = session::current_user(&db_pool, &session).await?;
    let following = match &viewer {
        Some(viewer) => viewer.following_ids(&db_pool).await?,
        None => Default::default(),
    };

    let empty = if users.is_empty() { "<h3>Sorry, no users found</h3>" } else { "" };
    let content = fill(
        include_res!(str, "/pages/users/index.html"),
        &[
            ("empty", empty),
            ("users", &user_cards(&users, viewer.as_ref(), &following)),
        ],
    );
    res::page(&session, viewer.as_ref(), "Users", &content).await
}
