use axum::{
    debug_handler,
    extract::State,
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{db, include_res, AppResult};

/// One feed entry, shared by the activity page, the home page's activity
/// panel, and profile pages.
pub(crate) fn feed_item(message: &db::MessageOverview) -> String {
    include_res!(str, "/pages/feed_item.html")
        .replace("{id}", &message.uuid)
        .replace("{author}", &message.author)
        .replace("{room_id}", &message.room_id)
        .replace("{room_name}", &message.room_name)
        .replace("{created}", &message.created)
        .replace("{body}", &message.body)
}

#[debug_handler]
pub async fn activity_page(State(db_pool): State<SqlitePool>) -> AppResult<Response> {
    let room_messages = db::activity(&db_pool).await?;

    let mut activity_items = String::new();
    for message in &room_messages {
        activity_items += &feed_item(message);
    }

    Ok(Html(
        include_res!(str, "/pages/activity.html").replace("{activity_items}", &activity_items),
    )
    .into_response())
}
