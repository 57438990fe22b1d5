mod login;
mod logout;
mod signup;

use axum::{routing::{get, post}, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", get(signup::signup_page).post(signup::signup))
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", post(logout::logout))
}

/// Treats an empty form field the same as a missing one.
pub(crate) fn non_empty(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty())
}
