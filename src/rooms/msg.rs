use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{db, include_res, res, session, AppResult};

/// Message bodies are markdown.
pub(crate) fn message_html(message: &db::MessageOverview) -> String {
    let mut body_html = String::new();
    pulldown_cmark::html::push_html(&mut body_html, pulldown_cmark::Parser::new(&message.body));

    include_res!(str, "/pages/message_item.html")
        .replace("{id}", &message.uuid)
        .replace("{author}", &message.author)
        .replace("{created}", &message.created)
        .replace("{body}", &body_html)
}

#[debug_handler]
pub(crate) async fn delete_message_page(
    Path(message_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let message_id = message_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/m/{message_id}/delete")).into_response());
    };
    let Some(message) = db::message_by_uuid(&db_pool, &message_id).await? else {
        return Ok(res::not_found("message"));
    };
    if user.uuid != message.user_id {
        return Ok(res::forbidden());
    }

    Ok(Html(
        include_res!(str, "/pages/delete.html")
            .replace("{action}", &format!("/m/{message_id}/delete"))
            .replace("{obj}", &message.body),
    )
    .into_response())
}

#[debug_handler]
pub(crate) async fn delete_message(
    Path(message_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let message_id = message_id.to_string();
    let Some(user) = session::user(&session, &db_pool).await? else {
        return Ok(session::login_redirect(&format!("/m/{message_id}/delete")).into_response());
    };
    let Some(message) = db::message_by_uuid(&db_pool, &message_id).await? else {
        return Ok(res::not_found("message"));
    };
    if user.uuid != message.user_id {
        return Ok(res::forbidden());
    }

    db::delete_message(&db_pool, &message.uuid).await?;
    tracing::info!(author = %user.username, "message deleted");

    Ok(Redirect::to("/").into_response())
}
