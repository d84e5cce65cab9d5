use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use common::format_validation_errors;
use db::models::geofence::{CreateGeofenceError, Model as GeofenceModel};
use validator::Validate;

use super::common::{CreateGeofenceRequest, CreatedGeofenceResponse};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /geofences
///
/// Create a geofence for one class session and hand back the join code.
///
/// ### Responses
/// - `201 Created` → `{ "fence_code": "Ab3dE9", "name": "GEO101" }`
/// - `400 Bad Request` → validation failure, inverted window, end time in
///   the past, or an unsupported fence type
/// - `409 Conflict` → a session with this name already exists on that date
/// - `500 Internal Server Error` → storage failure or exhausted code
///   allocation
pub async fn create_geofence(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateGeofenceRequest>,
) -> (StatusCode, Json<ApiResponse<CreatedGeofenceResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    match GeofenceModel::create(
        state.db(),
        &claims.user_matric,
        &req.name,
        req.latitude,
        req.longitude,
        req.radius,
        &req.fence_type,
        req.start_time,
        req.end_time,
        Utc::now(),
    )
    .await
    {
        Ok(fence) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                CreatedGeofenceResponse {
                    fence_code: fence.fence_code,
                    name: fence.name,
                },
                "Geofence created",
            )),
        ),
        Err(e @ CreateGeofenceError::InvalidDuration)
        | Err(e @ CreateGeofenceError::EndedInPast)
        | Err(e @ CreateGeofenceError::UnsupportedFenceType(_)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        }
        Err(e @ CreateGeofenceError::DuplicateSession) => {
            (StatusCode::CONFLICT, Json(ApiResponse::error(e.to_string())))
        }
        Err(CreateGeofenceError::CodeCollision) => {
            tracing::error!(name = %req.name, "exhausted fence code allocation attempts");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Could not allocate a unique fence code")),
            )
        }
        Err(CreateGeofenceError::Db(e)) => {
            tracing::error!(error = %e, name = %req.name, "failed to create geofence");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal error. Please try again")),
            )
        }
    }
}
