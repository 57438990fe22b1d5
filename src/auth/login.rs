use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::{debug, info};

use crate::{
    include_res,
    models::User,
    res::{self, escape, fill},
    session, AppResult,
};

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[debug_handler]
pub(crate) async fn login_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&db_pool, &session).await?;
    login_form(&session, user.as_ref(), "", None).await
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(LoginForm { username, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let Some(user) = User::authenticate(&db_pool, &username, &password).await? else {
        debug!("failed login for @{username}");
        return login_form(&session, None, &username, Some("Invalid credentials.")).await;
    };

    session::do_login(&session, &user).await?;
    session::flash(&session, "success", format!("Hello, {}!", user.username)).await?;
    info!("welcome back @{}#{}", user.username, user.id);

    Ok(Redirect::to("/").into_response())
}

async fn login_form(session: &Session, user: Option<&User>, username: &str, error: Option<&str>) -> AppResult<Response> {
    let errors = error.map(|e| res::alert("danger", e)).unwrap_or_default();
    let content = fill(
        include_res!(str, "/pages/login.html"),
        &[("errors", &errors), ("username", &escape(username))],
    );
    res::page(session, user, "Log in", &content).await
}
