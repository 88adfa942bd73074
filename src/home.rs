use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{activity, db, include_res, session, AppResult};

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub(crate) fn room_item(room: &db::RoomOverview) -> String {
    include_res!(str, "/pages/room_item.html")
        .replace("{id}", &room.uuid)
        .replace("{name}", &room.name)
        .replace("{host}", &room.host_name)
        .replace("{topic}", &room.topic_name)
        .replace("{created}", &room.created)
}

pub(crate) async fn nav(session: &Session, db_pool: &SqlitePool) -> AppResult<String> {
    Ok(match session::user(session, db_pool).await? {
        Some(user) => format!(
            r#"<a href="/p/{}">@{}</a> <a href="/logout">Logout</a>"#,
            user.uuid, user.username
        ),
        None => r#"<a href="/login">Login</a> <a href="/register">Register</a>"#.to_owned(),
    })
}

#[debug_handler]
pub async fn home(
    Query(SearchQuery { q }): Query<SearchQuery>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();

    let rooms = db::search_rooms(&db_pool, &q).await?;
    let room_count = rooms.len();
    let topics: Vec<db::Topic> =
        sqlx::query_as("SELECT uuid,name FROM topics ORDER BY rowid LIMIT 5")
            .fetch_all(&db_pool)
            .await?;
    let room_messages = db::messages_by_topic(&db_pool, &q).await?;

    let mut room_items = String::new();
    for room in &rooms {
        room_items += &room_item(room);
    }

    let mut topic_items = String::new();
    for topic in &topics {
        topic_items += &include_res!(str, "/pages/topic_item.html").replace("{name}", &topic.name);
    }

    let mut activity_items = String::new();
    for message in &room_messages {
        activity_items += &activity::feed_item(message);
    }

    Ok(Html(
        include_res!(str, "/pages/home.html")
            .replace("{nav}", &nav(&session, &db_pool).await?)
            .replace("{q}", &q)
            .replace("{room_count}", &room_count.to_string())
            .replace("{room_items}", &room_items)
            .replace("{topic_items}", &topic_items)
            .replace("{activity_items}", &activity_items),
    )
    .into_response())
}
