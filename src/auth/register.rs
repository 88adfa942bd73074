use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, include_res, session, AppResult};

#[derive(Deserialize)]
pub(crate) struct RegisterForm {
    username: String,
    email: String,
    password: String,
}

fn register_form(error: &str, username: &str, email: &str) -> Response {
    Html(
        include_res!(str, "/pages/register.html")
            .replace("{error}", error)
            .replace("{username}", username)
            .replace("{email}", email),
    )
    .into_response()
}

fn validate(form: &RegisterForm) -> Result<(), &'static str> {
    if form.username.trim().is_empty() {
        return Err("A username is required");
    }
    if !form.email.contains('@') {
        return Err("That email doesn't look right");
    }
    if form.password.len() < 8 {
        return Err("Passwords need at least 8 characters");
    }
    Ok(())
}

#[debug_handler]
pub(crate) async fn register_page() -> impl IntoResponse {
    register_form("", "", "")
}

#[debug_handler]
pub(crate) async fn register(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Err(error) = validate(&form) {
        return Ok(register_form(error, &form.username, &form.email));
    }

    let password_hash = bcrypt::hash(&form.password, bcrypt::DEFAULT_COST)?;
    let user = match db::create_user(&db_pool, &form.username, &form.email, &password_hash).await {
        Ok(user) => user,
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Ok(register_form(
                "That username or email is already taken",
                &form.username,
                &form.email,
            ));
        }
        Err(e) => return Err(e.into()),
    };

    // fresh accounts go straight to a signed-in session
    session::log_in(&session, &user).await?;
    tracing::info!(username = %user.username, "registered");

    Ok(Redirect::to("/").into_response())
}
