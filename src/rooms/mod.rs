mod delete;
mod edit;
mod form;
mod msg;
mod new;
mod room;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/new", get(new::new_room_page).post(new::new_room))
        .route("/{uuid}", get(room::room).post(room::post_message))
        .route("/{uuid}/edit", get(edit::edit_room_page).post(edit::edit_room))
        .route("/{uuid}/delete", get(delete::delete_room_page).post(delete::delete_room))
}

/// Message routes live under their own prefix, away from the room ids.
pub fn msg_router() -> Router<AppState> {
    Router::new().route(
        "/{uuid}/delete",
        get(msg::delete_message_page).post(msg::delete_message),
    )
}
