use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{res, session, AppResult};

/// Deletes the logged-in user's account along with everything they own.
#[debug_handler]
pub(crate) async fn delete_user(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    user.delete(&db_pool).await?;
    session::do_logout(&session).await?;
    info!("deleted @{}#{}", user.username, user.id);

    Ok(Redirect::to("/signup").into_response())
}
