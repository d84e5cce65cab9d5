//! Routes for the `/users` endpoint group (admin-only, guarded at nesting).
//!
//! - `GET /users/{user_matric}` → `get_user`

pub mod get;

use axum::{Router, routing::get as get_method};

use crate::state::AppState;
use get::get_user;

pub fn users_routes() -> Router<AppState> {
    Router::new().route("/{user_matric}", get_method(get_user))
}
