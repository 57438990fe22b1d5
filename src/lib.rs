pub mod auth;
pub mod config;
pub mod db;
pub mod index;
pub mod messages;
pub mod models;
pub mod res;
pub mod session;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

use axum::{extract::FromRef, http::StatusCode, response::{IntoResponse, Response}, routing::get, Router};
use sqlx::SqlitePool;
use tower_sessions::{MemoryStore, SessionManagerLayer};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// Every route of the application, with state and session handling attached.
pub fn app(app_state: AppState, session_layer: SessionManagerLayer<MemoryStore>) -> Router {
    Router::new()
        .route("/", get(index::index))
        .merge(auth::router())
        .merge(users::router())
        .merge(messages::router())
        .with_state(app_state)
        .layer(session_layer)
}

pub type AppResult<T> = Result<T, AppError>;
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!("{:#}\n{}", self.0, self.0.backtrace());
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("{:#}", self.0),
        )
            .into_response()
    }
}

impl From<String> for AppError {
    fn from(err: String) -> Self {
        Self(anyhow::Error::msg(err))
    }
}

impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        Self(anyhow::Error::msg(err.to_owned()))
    }
}

macro_rules! apperr_impl {
    ($E:ty) => {
        impl From<$E> for AppError {
            fn from(err: $E) -> Self {
                Self(anyhow::Error::from(err))
            }
        }
    };
}

apperr_impl!(sqlx::Error);
apperr_impl!(models::ModelError);
apperr_impl!(tower_sessions::session::Error);
apperr_impl!(axum::Error);
