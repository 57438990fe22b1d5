use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    auth::non_empty,
    include_res,
    models::{ProfileUpdate, User},
    res::{self, escape, fill},
    session, AppResult,
};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProfileForm {
    username: Option<String>,
    email: Option<String>,
    image_url: Option<String>,
    header_image_url: Option<String>,
    bio: Option<String>,
    location: Option<String>,
    #[serde(default)]
    password: String,
}

impl ProfileForm {
    fn from_user(user: &User) -> ProfileForm {
        ProfileForm {
            username: Some(user.username.clone()),
            email: Some(user.email.clone()),
            image_url: user.image_url.clone(),
            header_image_url: user.header_image_url.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            password: String::new(),
        }
    }
}

#[debug_handler]
pub(crate) async fn edit_profile_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    profile_form(&session, &user, &ProfileForm::from_user(&user), &[]).await
}

#[debug_handler]
pub(crate) async fn edit_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    if User::authenticate(&db_pool, &user.username, &form.password).await?.is_none() {
        session::flash(&session, "danger", "Wrong password, please try again.").await?;
        return Ok(Redirect::to("/").into_response());
    }

    let (Some(username), Some(email)) = (non_empty(form.username.clone()), non_empty(form.email.clone())) else {
        let errors = ["Username and e-mail are required.".to_owned()];
        return profile_form(&session, &user, &form, &errors).await;
    };

    let image_urls = [&form.image_url, &form.header_image_url];
    if image_urls.into_iter().flatten().any(|url| !res::is_web_url(url)) {
        let errors = ["Image URLs must be http or https links.".to_owned()];
        return profile_form(&session, &user, &form, &errors).await;
    }

    let update = ProfileUpdate {
        username: username.trim().to_owned(),
        email: email.trim().to_owned(),
        image_url: non_empty(form.image_url.clone()),
        header_image_url: non_empty(form.header_image_url.clone()),
        bio: non_empty(form.bio.clone()),
        location: non_empty(form.location.clone()),
    };

    match user.update_profile(&db_pool, &update).await {
        Ok(user) => {
            info!("@{} updated their profile", user.username);
            Ok(Redirect::to(&format!("/users/{}", user.id)).into_response())
        }
        Err(err) if err.is_integrity() => {
            let errors = ["Username or e-mail already taken".to_owned()];
            profile_form(&session, &user, &form, &errors).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn profile_form(session: &Session, user: &User, form: &ProfileForm, errors: &[String]) -> AppResult<Response> {
    let errors: String = errors.iter().map(|e| res::alert("danger", e)).collect();
    let field = |value: &Option<String>| escape(value.as_deref().unwrap_or_default());

    let content = fill(
        include_res!(str, "/pages/users/edit.html"),
        &[
            ("errors", &errors),
            ("id", &user.id.to_string()),
            ("username", &field(&form.username)),
            ("email", &field(&form.email)),
            ("image_url", &field(&form.image_url)),
            ("header_image_url", &field(&form.header_image_url)),
            ("bio", &field(&form.bio)),
            ("location", &field(&form.location)),
        ],
    );
    res::page(session, Some(user), "Edit profile", &content).await
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::{
        models::User,
        testing::{memory_pool, signup, TestClient},
    };

    #[tokio::test]
    async fn edit_form_is_prefilled() {
        let db_pool = memory_pool().await;
        signup(&db_pool, "testuser", "test@test.com", "testuser").await;
        let mut client = TestClient::new(db_pool);
        client.login("testuser", "testuser").await;

        let resp = client.get("/users/profile").await;

        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.contains(r#"value="test@test.com""#));
    }

    #[tokio::test]
    async fn edit_with_correct_password_saves() {
        let db_pool = memory_pool().await;
        let me = signup(&db_pool, "testuser", "test@test.com", "testuser").await;
        let mut client = TestClient::new(db_pool.clone());
        client.login("testuser", "testuser").await;

        let resp = client
            .post_form(
                "/users/profile",
                "username=testuser&email=test%40test.com&bio=Hello+world&location=Paris&password=testuser",
            )
            .await;

        assert_eq!(resp.status, StatusCode::SEE_OTHER);
        let me = User::get(&db_pool, me.id).await.unwrap().unwrap();
        assert_eq!(me.bio.as_deref(), Some("Hello world"));
        assert_eq!(me.location.as_deref(), Some("Paris"));
    }

    #[tokio::test]
    async fn edit_with_wrong_password_changes_nothing() {
        let db_pool = memory_pool().await;
        let me = signup(&db_pool, "testuser", "test@test.com", "testuser").await;
        let mut client = TestClient::new(db_pool.clone());
        client.login("testuser", "testuser").await;

        let resp = client
            .post_form("/users/profile", "username=hacked&email=test%40test.com&password=wrong")
            .await;

        assert_eq!(resp.location.as_deref(), Some("/"));
        assert_eq!(User::get(&db_pool, me.id).await.unwrap().unwrap().username, "testuser");
        let home = client.get("/").await;
        assert!(home.body.contains("Wrong password, please try again."));
    }

    #[tokio::test]
    async fn script_image_urls_are_refused() {
        let db_pool = memory_pool().await;
        let me = signup(&db_pool, "testuser", "test@test.com", "testuser").await;
        let mut client = TestClient::new(db_pool.clone());
        client.login("testuser", "testuser").await;

        let resp = client
            .post_form(
                "/users/profile",
                "username=testuser&email=test%40test.com&header_image_url=javascript%3Aalert(1)&password=testuser",
            )
            .await;

        assert_eq!(resp.status, StatusCode::OK);
        assert!(resp.body.contains("Image URLs must be http or https links."));
        assert!(User::get(&db_pool, me.id).await.unwrap().unwrap().header_image_url.is_none());
    }

    #[tokio::test]
    async fn header_url_cannot_break_out_of_css() {
        let db_pool = memory_pool().await;
        let me = signup(&db_pool, "testuser", "test@test.com", "testuser").await;
        let mut client = TestClient::new(db_pool.clone());
        client.login("testuser", "testuser").await;

        client
            .post_form(
                "/users/profile",
                "username=testuser&email=test%40test.com&header_image_url=https%3A%2F%2Fx%2F%27)%3Bbackground%3Ared&password=testuser",
            )
            .await;
        let profile = client.get(&format!("/users/{}", me.id)).await;

        assert!(profile.body.contains("url('https://x/%27%29;background:red')"));
    }
}
