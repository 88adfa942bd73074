use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, include_res, res, session, AppResult};

use super::msg;

#[derive(Deserialize)]
pub(crate) struct MessageForm {
    body: String,
}

#[debug_handler]
pub(crate) async fn room(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    let Some(room) = db::room_overview(&db_pool, &room_id.to_string()).await? else {
        return Ok(res::not_found("room"));
    };

    let mut messages = String::new();
    for message in &db::room_messages(&db_pool, &room.uuid).await? {
        messages += &msg::message_html(message);
    }

    let mut participant_items = String::new();
    for (uuid, username) in &db::participants(&db_pool, &room.uuid).await? {
        participant_items += &include_res!(str, "/pages/participant_item.html")
            .replace("{id}", uuid)
            .replace("{username}", username);
    }

    Ok(Html(
        include_res!(str, "/pages/room.html")
            .replace("{id}", &room.uuid)
            .replace("{name}", &room.name)
            .replace("{topic}", &room.topic_name)
            .replace("{host}", &room.host_name)
            .replace("{description}", room.description.as_deref().unwrap_or(""))
            .replace("{messages}", &messages)
            .replace("{participants}", &participant_items),
    )
    .into_response())
}

#[debug_handler]
pub(crate) async fn post_message(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(MessageForm { body }): Form<MessageForm>,
) -> AppResult<Response> {
    let room_id = room_id.to_string();
    let Some(room) = db::room_by_uuid(&db_pool, &room_id).await? else {
        return Ok(res::not_found("room"));
    };

    // messages carry a non-null author, so guests go sign in first
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/r/{room_id}")).into_response());
    };

    db::create_message(&db_pool, &room.uuid, &user.uuid, &body).await?;

    // redirect-after-post, a refresh must not double-submit
    Ok(Redirect::to(&format!("/r/{}", room.uuid)).into_response())
}
