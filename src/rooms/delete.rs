use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, include_res, res, session, AppResult};

#[debug_handler]
pub(crate) async fn delete_room_page(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let room_id = room_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/r/{room_id}/delete")).into_response());
    };
    let Some(room) = db::room_by_uuid(&db_pool, &room_id).await? else {
        return Ok(res::not_found("room"));
    };
    if user.uuid != room.host_id {
        return Ok(res::forbidden());
    }

    Ok(Html(
        include_res!(str, "/pages/delete.html")
            .replace("{action}", &format!("/r/{room_id}/delete"))
            .replace("{obj}", &room.name),
    )
    .into_response())
}

#[debug_handler]
pub(crate) async fn delete_room(
    Path(room_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let room_id = room_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/r/{room_id}/delete")).into_response());
    };
    let Some(room) = db::room_by_uuid(&db_pool, &room_id).await? else {
        return Ok(res::not_found("room"));
    };
    if user.uuid != room.host_id {
        return Ok(res::forbidden());
    }

    db::delete_room(&db_pool, &room.uuid).await?;
    tracing::info!(host = %user.username, room = %room.name, "room deleted");

    Ok(Redirect::to("/").into_response())
}
