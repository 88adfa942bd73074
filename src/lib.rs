pub mod activity;
pub mod appresult;
pub mod auth;
pub mod db;
pub mod home;
pub mod profiles;
pub mod res;
pub mod rooms;
pub mod session;
pub mod topics;

use axum::{extract::FromRef, routing::get, Router};
use sqlx::SqlitePool;

pub use appresult::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
}

/// The full route table. Session and trace layers go on top in `main` (and
/// in the integration tests).
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/topics", get(topics::topics_page))
        .route("/activity", get(activity::activity_page))
        .merge(auth::router())
        .nest("/r", rooms::router())
        .nest("/m", rooms::msg_router())
        .nest("/p", profiles::router())
        .with_state(state)
}
