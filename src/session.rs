use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tower_sessions::Session;
use tracing::debug;

use crate::{models::User, AppResult};

/// Id of the logged-in user. Absent means anonymous.
pub const CURR_USER: &str = "curr_user";
pub const FLASHES: &str = "flashes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub category: String,
    pub message: String,
}

pub async fn current_user_id(session: &Session) -> AppResult<Option<i64>> {
    Ok(session.get::<i64>(CURR_USER).await?)
}

/// Loads the logged-in user. A session pointing at a deleted account is
/// treated as anonymous and cleaned up.
pub async fn current_user(db_pool: &SqlitePool, session: &Session) -> AppResult<Option<User>> {
    let Some(user_id) = current_user_id(session).await? else {
        return Ok(None);
    };

    let user = User::get(db_pool, user_id).await?;
    if user.is_none() {
        debug!("session refers to missing user #{user_id}");
        session.remove::<i64>(CURR_USER).await?;
    }
    Ok(user)
}

pub async fn do_login(session: &Session, user: &User) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(CURR_USER, user.id).await?;
    Ok(())
}

pub async fn do_logout(session: &Session) -> AppResult<()> {
    session.remove::<i64>(CURR_USER).await?;
    Ok(())
}

pub async fn flash(session: &Session, category: &str, message: impl Into<String>) -> AppResult<()> {
    let mut flashes = session.get::<Vec<Flash>>(FLASHES).await?.unwrap_or_default();
    flashes.push(Flash {
        category: category.to_owned(),
        message: message.into(),
    });
    session.insert(FLASHES, flashes).await?;
    Ok(())
}

pub async fn take_flashes(session: &Session) -> AppResult<Vec<Flash>> {
    Ok(session.remove::<Vec<Flash>>(FLASHES).await?.unwrap_or_default())
}
