mod login;
mod logout;
mod register;

use axum::{routing::get, Router};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login::login_page).post(login::login))
        .route("/logout", get(logout::logout))
        .route("/register", get(register::register_page).post(register::register))
}
