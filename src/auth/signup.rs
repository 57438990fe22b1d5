use axum::{debug_handler, extract::State, response::{IntoResponse, Redirect, Response}, Form};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    include_res,
    models::{NewUser, User},
    res::{self, escape, fill},
    session, AppResult,
};

use super::non_empty;

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignupForm {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
    image_url: Option<String>,
}

impl SignupForm {
    fn errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if non_empty(self.username.clone()).is_none() {
            errors.push("Username is required.".to_owned());
        }
        match non_empty(self.email.clone()) {
            None => errors.push("E-mail is required.".to_owned()),
            Some(email) if !email.contains('@') => errors.push("Invalid e-mail address.".to_owned()),
            Some(_) => {}
        }
        match &self.password {
            Some(password) if password.chars().count() >= MIN_PASSWORD_LEN => {}
            _ => errors.push(format!("Password must be at least {MIN_PASSWORD_LEN} characters.")),
        }
        if self.image_url.as_deref().is_some_and(|url| !res::is_web_url(url)) {
            errors.push("Image URLs must be http or https links.".to_owned());
        }
        errors
    }
}

#[debug_handler]
pub(crate) async fn signup_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let user = session::current_user(&db_pool, &session).await?;
    signup_form(&session, user.as_ref(), &SignupForm::default(), &[]).await
}

#[debug_handler]
pub(crate) async fn signup(
    State(db_pool): State<SqlitePool>,
    session: Session,

    Form(form): Form<SignupForm>,
) -> AppResult<Response> {
    let errors = form.errors();
    if !errors.is_empty() {
        return signup_form(&session, None, &form, &errors).await;
    }

    let new_user = NewUser {
        email: non_empty(form.email.clone()).map(|e| e.trim().to_owned()),
        username: non_empty(form.username.clone()).map(|u| u.trim().to_owned()),
        password: form.password.clone(),
        image_url: non_empty(form.image_url.clone()),
    };

    match User::signup(&db_pool, new_user).await {
        Ok(user) => {
            session::do_login(&session, &user).await?;
            info!("welcome @{}#{}", user.username, user.id);
            Ok(Redirect::to("/").into_response())
        }
        Err(err) if err.is_integrity() => {
            signup_form(&session, None, &form, &["Username already taken".to_owned()]).await
        }
        Err(err) => Err(err.into()),
    }
}

async fn signup_form(session: &Session, user: Option<&User>, form: &SignupForm, errors: &[String]) -> AppResult<Response> {
    let errors: String = errors.iter().map(|e| res::alert("danger", e)).collect();
    let content = fill(
        include_res!(str, "/pages/signup.html"),
        &[
            ("errors", &errors),
            ("username", &escape(form.username.as_deref().unwrap_or_default())),
            ("email", &escape(form.email.as_deref().unwrap_or_default())),
            ("image_url", &escape(form.image_url.as_deref().unwrap_or_default())),
        ],
    );
    res::page(session, user, "Sign up", &content).await
}
