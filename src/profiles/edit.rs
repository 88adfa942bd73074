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
pub(crate) struct ProfileForm {
    username: String,
    email: String,
    bio: String,
    avatar: String,
}

fn profile_form(error: &str, username: &str, email: &str, bio: &str, avatar: &str) -> Response {
    Html(
        include_res!(str, "/pages/update_user.html")
            .replace("{error}", error)
            .replace("{username}", username)
            .replace("{email}", email)
            .replace("{bio}", bio)
            .replace("{avatar}", avatar),
    )
    .into_response()
}

fn validate(form: &ProfileForm) -> Result<(), &'static str> {
    if form.username.trim().is_empty() {
        return Err("A username is required");
    }
    if !form.email.contains('@') {
        return Err("That email doesn't look right");
    }
    Ok(())
}

#[debug_handler]
pub(crate) async fn edit_profile_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect("/p/edit").into_response());
    };

    Ok(profile_form(
        "",
        &user.username,
        &user.email,
        user.bio.as_deref().unwrap_or(""),
        user.avatar.as_deref().unwrap_or(""),
    ))
}

#[debug_handler]
pub(crate) async fn edit_profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(form): Form<ProfileForm>,
) -> AppResult<Response> {
    // always the requester, never a path-supplied id
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect("/p/edit").into_response());
    };

    if let Err(error) = validate(&form) {
        return Ok(profile_form(error, &form.username, &form.email, &form.bio, &form.avatar));
    }

    let bio = (!form.bio.is_empty()).then_some(form.bio.as_str());
    let avatar = (!form.avatar.is_empty()).then_some(form.avatar.as_str());
    match db::update_user(&db_pool, &user.uuid, &form.username, &form.email, bio, avatar).await {
        Ok(()) => {}
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Ok(profile_form(
                "That username or email is already taken",
                &form.username,
                &form.email,
                &form.bio,
                &form.avatar,
            ));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Redirect::to(&format!("/p/{}", user.uuid)).into_response())
}
