use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::auth::guards::{allow_admin, allow_student};
use crate::state::AppState;

mod common;
mod get;
mod post;

pub use common::{AttendanceRecordResponse, RecordAttendanceRequest};
pub use get::{get_my_attendance, get_session_attendance};
pub use post::record_attendance;

/// The `/attendance` route group.
///
/// Recording and the "my records" view are student-only; the per-session
/// report is admin-only (and creator-only inside the handler).
pub fn attendance_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            post(record_attendance)
                .route_layer(from_fn_with_state(app_state.clone(), allow_student)),
        )
        .route(
            "/",
            get(get_session_attendance)
                .route_layer(from_fn_with_state(app_state.clone(), allow_admin)),
        )
        .route(
            "/me",
            get(get_my_attendance).route_layer(from_fn_with_state(app_state.clone(), allow_student)),
        )
}
