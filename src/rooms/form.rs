use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::{db, include_res};

/// Shared by the create and edit forms; edits ignore the description field.
#[derive(Debug, Deserialize)]
pub(crate) struct RoomForm {
    pub(crate) topic: String,
    pub(crate) name: String,
    pub(crate) description: String,
}

/// `<option>` list of every known topic, for the form's datalist.
pub(crate) async fn topic_options(db_pool: &SqlitePool) -> sqlx::Result<String> {
    let topics = db::topics(db_pool, "").await?;
    let mut options = String::new();
    for topic in &topics {
        options += &format!("<option value=\"{}\">", topic.name);
    }
    Ok(options)
}

pub(crate) fn render(
    action: &str,
    topic: &str,
    name: &str,
    description: &str,
    topic_options: &str,
) -> Response {
    Html(
        include_res!(str, "/pages/room_form.html")
            .replace("{action}", action)
            .replace("{topic}", topic)
            .replace("{name}", name)
            .replace("{description}", description)
            .replace("{topic_options}", topic_options),
    )
    .into_response()
}
