use axum::response::Redirect;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, AppResult};

pub const USER_ID: &str = "user_id";
pub const RETURN_URL: &str = "return_url";
pub const FLASH: &str = "flash";

/// The logged-in user, if any. A stale session pointing at a user row that
/// no longer exists counts as logged out.
pub async fn user(session: &Session, db_pool: &SqlitePool) -> AppResult<Option<db::User>> {
    let Some(user_id) = session.get::<String>(USER_ID).await? else {
        return Ok(None);
    };
    Ok(db::user_by_uuid(db_pool, &user_id).await?)
}

pub async fn log_in(session: &Session, user: &db::User) -> AppResult<()> {
    session.insert(USER_ID, &user.uuid).await?;
    Ok(())
}

/// One-shot message left for the next page render, cleared on read.
pub async fn flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH, message).await?;
    Ok(())
}

pub async fn take_flash(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(FLASH).await?)
}

/// Guarded pages bounce guests here; login sends them back afterwards.
pub fn login_redirect(return_url: &str) -> Redirect {
    Redirect::to(&format!("/login?return_url={return_url}"))
}
