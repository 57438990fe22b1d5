//! Fixtures shared by the test modules: an in-memory database and a client
//! that drives the router while carrying the session cookie along.

use std::str::FromStr;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

use crate::{
    app, db,
    models::{NewUser, User},
    AppState,
};

/// A fresh, migrated database. One connection only, so every query sees the
/// same in-memory database.
pub(crate) async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();
    db::migrate(&db_pool).await.unwrap();
    db_pool
}

pub(crate) async fn signup(db_pool: &SqlitePool, username: &str, email: &str, password: &str) -> User {
    User::signup(
        db_pool,
        NewUser {
            email: Some(email.to_owned()),
            username: Some(username.to_owned()),
            password: Some(password.to_owned()),
            image_url: None,
        },
    )
    .await
    .unwrap()
}

/// Inserts a user whose password column holds a placeholder rather than a hash.
pub(crate) async fn plain_user(db_pool: &SqlitePool, username: &str, email: &str) -> User {
    User::create(
        db_pool,
        &NewUser {
            email: Some(email.to_owned()),
            username: Some(username.to_owned()),
            password: Some("HASHED_PASSWORD".to_owned()),
            image_url: None,
        },
    )
    .await
    .unwrap()
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

pub(crate) struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(db_pool: SqlitePool) -> TestClient {
        let session_layer = SessionManagerLayer::new(MemoryStore::default()).with_secure(false);
        TestClient {
            app: app(AppState { db_pool }, session_layer),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_owned()))
            .unwrap();
        self.send(request).await
    }

    pub async fn login(&mut self, username: &str, password: &str) {
        let resp = self
            .post_form("/login", &format!("username={username}&password={password}"))
            .await;
        assert_eq!(resp.status, StatusCode::SEE_OTHER, "login as {username} failed");
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder
    }

    async fn send(&mut self, request: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = resp.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_owned());
        }

        let status = resp.status();
        let location = resp
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_owned());
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
