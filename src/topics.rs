use axum::{
    debug_handler,
    extract::{Query, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;

use crate::{db, home::SearchQuery, include_res, AppResult};

#[debug_handler]
pub async fn topics_page(
    Query(SearchQuery { q }): Query<SearchQuery>,
    State(db_pool): State<SqlitePool>,
) -> AppResult<Response> {
    let q = q.unwrap_or_default();
    let topics = db::topics_with_counts(&db_pool, &q).await?;

    let mut topic_items = String::new();
    for topic in &topics {
        topic_items += &include_res!(str, "/pages/topic_row.html")
            .replace("{name}", &topic.name)
            .replace("{count}", &topic.room_count.to_string());
    }

    Ok(Html(
        include_res!(str, "/pages/topics.html")
            .replace("{q}", &q)
            .replace("{topic_items}", &topic_items),
    )
    .into_response())
}
