use axum::{http::StatusCode, response::{IntoResponse, Response}};

#[macro_export]
macro_rules! include_res {
    (bytes, $p:expr) => {
        include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
    (str, $p:expr) => {
        include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/res", $p))
    };
}

/// Direct-id lookups that miss end up here, nothing fancier.
pub fn not_found(what: &str) -> Response {
    (StatusCode::NOT_FOUND, format!("sorry, no such {what}")).into_response()
}

/// Ownership checks short-circuit here before any mutation happens.
pub fn forbidden() -> Response {
    (StatusCode::FORBIDDEN, "You are not allowed here!").into_response()
}
