use axum::{
    debug_handler,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, res, session, AppResult};

use super::form::{self, RoomForm};

#[debug_handler]
pub(crate) async fn edit_room_page(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let room_id = room_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/r/{room_id}/edit")).into_response());
    };
    let Some(room) = db::room_by_uuid(&db_pool, &room_id).await? else {
        return Ok(res::not_found("room"));
    };
    if user.uuid != room.host_id {
        return Ok(res::forbidden());
    }

    let (topic_name,): (String,) = sqlx::query_as("SELECT name FROM topics WHERE uuid=?")
        .bind(&room.topic_id)
        .fetch_one(&db_pool)
        .await?;

    let topic_options = form::topic_options(&db_pool).await?;
    Ok(form::render(
        &format!("/r/{room_id}/edit"),
        &topic_name,
        &room.name,
        room.description.as_deref().unwrap_or(""),
        &topic_options,
    ))
}

#[debug_handler]
pub(crate) async fn edit_room(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(RoomForm { topic, name, description: _ }): Form<RoomForm>,
) -> AppResult<Response> {
    let room_id = room_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/r/{room_id}/edit")).into_response());
    };
    let Some(room) = db::room_by_uuid(&db_pool, &room_id).await? else {
        return Ok(res::not_found("room"));
    };
    if user.uuid != room.host_id {
        return Ok(res::forbidden());
    }

    let topic = db::get_or_create_topic(&db_pool, &topic).await?;
    db::update_room(&db_pool, &room.uuid, &topic.uuid, &name).await?;
    tracing::info!(host = %user.username, room = %name, "room updated");

    Ok(Redirect::to("/").into_response())
}
