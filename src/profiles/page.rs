use axum::{
    debug_handler,
    extract::{Path, State},
    response::{Html, IntoResponse, Response},
};
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{activity, db, home, include_res, res, session, AppResult};

/// Any signed-in user may look at any profile; edits always go through
/// `/p/edit` and touch the requester only.
#[debug_handler]
pub(crate) async fn profile(
    Path(profile_id): Path<Uuid>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Response> {
    let profile_id = profile_id.to_string();
    if session::user(&session, &db_pool).await?.is_none() {
        return Ok(session::login_redirect(&format!("/p/{profile_id}")).into_response());
    }
    let Some(user) = db::user_by_uuid(&db_pool, &profile_id).await? else {
        return Ok(res::not_found("profile"));
    };

    let mut room_items = String::new();
    for room in &db::rooms_by_host(&db_pool, &user.uuid).await? {
        room_items += &home::room_item(room);
    }

    let mut activity_items = String::new();
    for message in &db::messages_by_user(&db_pool, &user.uuid).await? {
        activity_items += &activity::feed_item(message);
    }

    let mut topic_items = String::new();
    for topic in &db::topics(&db_pool, "").await? {
        topic_items += &include_res!(str, "/pages/topic_item.html").replace("{name}", &topic.name);
    }

    Ok(Html(
        include_res!(str, "/pages/profile.html")
            .replace("{id}", &user.uuid)
            .replace("{username}", &user.username)
            .replace("{avatar}", user.avatar.as_deref().unwrap_or(""))
            .replace("{bio}", user.bio.as_deref().unwrap_or(""))
            .replace("{room_items}", &room_items)
            .replace("{activity_items}", &activity_items)
            .replace("{topic_items}", &topic_items),
    )
    .into_response())
}
