use axum::{
    debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{db, session, AppResult};

use super::form::{self, RoomForm};

#[debug_handler]
pub(crate) async fn new_room_page(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    if session::user(&session, &db_pool).await?.is_none() {
        return Ok(session::login_redirect("/r/new").into_response());
    }

    let topic_options = form::topic_options(&db_pool).await?;
    Ok(form::render("/r/new", "", "", "", &topic_options))
}

#[debug_handler]
pub(crate) async fn new_room(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Form(RoomForm { topic, name, description }): Form<RoomForm>,
) -> AppResult<Response> {
    // rooms carry a non-null host, so guests go sign in first
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect("/r/new").into_response());
    };

    let topic = db::get_or_create_topic(&db_pool, &topic).await?;
    let description = (!description.is_empty()).then_some(description);
    db::create_room(&db_pool, &user.uuid, &topic.uuid, &name, description.as_deref()).await?;
    tracing::info!(host = %user.username, room = %name, "room created");

    Ok(Redirect::to("/").into_response())
}
