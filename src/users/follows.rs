use axum::{debug_handler, extract::{Path, State}, response::{IntoResponse, Redirect, Response}};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::info;

use crate::{
    include_res,
    models::User,
    res::{self, escape, fill},
    session, AppResult,
};

use super::{user_cards, user_detail};

#[derive(Clone, Copy)]
enum Direction {
    Following,
    Followers,
}

#[debug_handler]
pub(crate) async fn show_following(
    Path(user_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    show_people(&db_pool, &session, user_id, Direction::Following).await
}

#[debug_handler]
pub(crate) async fn show_followers(
    Path(user_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    show_people(&db_pool, &session, user_id, Direction::Followers).await
}

async fn show_people(db_pool: &SqlitePool, session: &Session, user_id: i64, direction: Direction) -> AppResult<Response> {
    let Some(viewer) = session::current_user(db_pool, session).await? else {
        return res::unauthorized(session).await;
    };

    let Some(user) = User::get(db_pool, user_id).await? else {
        return res::sorry("user");
    };

    let (people, heading, title) = match direction {
        Direction::Following => (
            user.following(db_pool).await?,
            format!("Followed by @{}:", user.username),
            "Following",
        ),
        Direction::Followers => (
            user.followers(db_pool).await?,
            format!("Followers of @{}:", user.username),
            "Followers",
        ),
    };

    let following = viewer.following_ids(db_pool).await?;
    let body = fill(
        include_res!(str, "/pages/users/people.html"),
        &[
            ("heading", &escape(&heading)),
            ("users", &user_cards(&people, Some(&viewer), &following)),
        ],
    );

    user_detail(db_pool, session, Some(&viewer), &user, title, &body).await
}

#[debug_handler]
pub(crate) async fn follow(
    Path(follow_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    let Some(followee) = User::get(&db_pool, follow_id).await? else {
        return res::sorry("user");
    };

    user.follow(&db_pool, &followee).await?;
    info!("@{} follows @{}", user.username, followee.username);

    Ok(Redirect::to(&format!("/users/{}/following", user.id)).into_response())
}

#[debug_handler]
pub(crate) async fn stop_following(
    Path(follow_id): Path<i64>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&db_pool, &session).await? else {
        return res::unauthorized(&session).await;
    };

    let Some(followee) = User::get(&db_pool, follow_id).await? else {
        return res::sorry("user");
    };

    user.unfollow(&db_pool, &followee).await?;
    info!("@{} stopped following @{}", user.username, followee.username);

    Ok(Redirect::to(&format!("/users/{}/following", user.id)).into_response())
}
