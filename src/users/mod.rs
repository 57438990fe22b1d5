mod delete;
mod edit;
mod follows;
mod likes;
mod list;
mod page;

use std::collections::HashSet;

use axum::{response::Response, routing::{get, post}, Router};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    include_res,
    models::User,
    res::{self, escape, fill},
    AppResult, AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list::list_users))
        .route("/users/profile", get(edit::edit_profile_page).post(edit::edit_profile))
        .route("/users/delete", post(delete::delete_user))
        .route("/users/follow/{follow_id}", post(follows::follow))
        .route("/users/stop-following/{follow_id}", post(follows::stop_following))
        .route("/users/{user_id}", get(page::show_user))
        .route("/users/{user_id}/following", get(follows::show_following))
        .route("/users/{user_id}/followers", get(follows::show_followers))
        .route("/users/{user_id}/likes", get(likes::show_likes))
}

fn follow_button(user: &User, is_following: bool) -> String {
    let template = if is_following {
        include_res!(str, "/pages/users/unfollow_button.html")
    } else {
        include_res!(str, "/pages/users/follow_button.html")
    };
    fill(template, &[("id", &user.id.to_string())])
}

/// Cards for a list of users, with follow controls for everyone but the viewer.
pub(crate) fn user_cards(users: &[User], viewer: Option<&User>, following: &HashSet<i64>) -> String {
    users
        .iter()
        .map(|user| {
            let button = match viewer {
                Some(viewer) if viewer.id != user.id => follow_button(user, following.contains(&user.id)),
                _ => String::new(),
            };
            fill(
                include_res!(str, "/pages/users/card.html"),
                &[
                    ("id", &user.id.to_string()),
                    ("username", &escape(&user.username)),
                    ("image_url", &escape(user.image_url())),
                    ("header_image_url", &escape(user.header_image_url())),
                    ("bio", &escape(user.bio.as_deref().unwrap_or_default())),
                    ("follow_button", &button),
                ],
            )
        })
        .collect()
}

/// A user's profile frame (header, stats, sidebar) around `body`. Only the
/// user themselves gets the edit controls.
pub(crate) async fn user_detail(
    db_pool: &SqlitePool,
    session: &Session,
    viewer: Option<&User>,
    user: &User,
    title: &str,
    body: &str,
) -> AppResult<Response> {
    let stats = user.stats(db_pool).await?;

    let actions = match viewer {
        Some(viewer) if viewer.id == user.id => include_res!(str, "/pages/users/own_actions.html").to_owned(),
        Some(viewer) => follow_button(user, viewer.is_following(db_pool, user).await?),
        None => String::new(),
    };

    let content = fill(
        include_res!(str, "/pages/users/detail.html"),
        &[
            ("id", &user.id.to_string()),
            ("username", &escape(&user.username)),
            ("image_url", &escape(user.image_url())),
            ("header_image_url", &res::css_url(user.header_image_url())),
            ("bio", &escape(user.bio.as_deref().unwrap_or_default())),
            ("location", &escape(user.location.as_deref().unwrap_or_default())),
            ("messages_count", &stats.messages.to_string()),
            ("following_count", &stats.following.to_string()),
            ("followers_count", &stats.followers.to_string()),
            ("likes_count", &stats.likes.to_string()),
            ("actions", &actions),
            ("body", body),
        ],
    );
    res::page(session, viewer, title, &content).await
}
