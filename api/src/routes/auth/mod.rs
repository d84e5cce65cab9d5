//! Routes for the `/auth` endpoint group.
//!
//! - `POST /auth/register` → `register`
//! - `POST /auth/login` → `login`

pub mod post;

use axum::{Router, routing::post as post_method};

use crate::state::AppState;
use post::{login, register};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post_method(register))
        .route("/login", post_method(login))
}
