//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → liveness probe (public)
//! - `/auth` → register and login (public)
//! - `/users` → user lookup with attendance history (admin-only)
//! - `/geofences` → session creation, listing and deactivation
//! - `/attendance` → attendance recording and reads

use axum::{Router, middleware::from_fn_with_state};

use crate::auth::guards::allow_admin;
use crate::routes::{
    attendance::attendance_routes, auth::auth_routes, geofences::geofence_routes,
    health::health_routes, users::users_routes,
};
use crate::state::AppState;

pub mod attendance;
pub mod auth;
pub mod geofences;
pub mod health;
pub mod users;

/// Builds the complete application router for all HTTP endpoints.
///
/// Role guards are applied per group: `/users` is admin-only wholesale,
/// while `/geofences` and `/attendance` mix admin, student and
/// authenticated-only routes and lay their guards on per-route.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/users",
            users_routes().route_layer(from_fn_with_state(app_state.clone(), allow_admin)),
        )
        .nest("/geofences", geofence_routes(app_state.clone()))
        .nest("/attendance", attendance_routes(app_state.clone()))
        .with_state(app_state)
}
