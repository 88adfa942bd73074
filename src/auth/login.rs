use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, session, session::RETURN_URL, AppResult};

#[derive(Deserialize)]
pub(crate) struct LoginQuery {
    return_url: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct LoginForm {
    email: String,
    password: String,
}

fn login_form(flash: &str) -> Response {
    Html(include_res!(str, "/pages/login.html").replace("{flash}", flash)).into_response()
}

#[debug_handler]
pub(crate) async fn login_page(
    Query(LoginQuery { return_url }): Query<LoginQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    // already signed in, nothing to ask
    if session::user(&session, &db_pool).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    if let Some(return_url) = return_url {
        session.insert(RETURN_URL, return_url).await?;
    }

    let flash = session::take_flash(&session).await?.unwrap_or_default();
    Ok(login_form(&flash))
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(LoginForm { email, password }): Form<LoginForm>,
) -> AppResult<Response> {
    let email = email.to_lowercase();

    let Some(user) = db::user_by_email(&db_pool, &email).await? else {
        session::flash(&session, "User does not exist").await?;
        return Ok(Redirect::to("/login").into_response());
    };

    if !bcrypt::verify(&password, &user.password_hash)? {
        tracing::warn!(username = %user.username, "failed login");
        return Ok(login_form("Username OR password does not exist"));
    }

    session::log_in(&session, &user).await?;
    tracing::info!(username = %user.username, "logged in");

    let return_url: Option<String> = session.remove(RETURN_URL).await?;
    Ok(Redirect::to(return_url.as_deref().unwrap_or("/")).into_response())
}
