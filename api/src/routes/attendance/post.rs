use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use common::format_validation_errors;
use db::models::attendance_record::{Model as AttendanceRecordModel, RecordAttendanceError};
use validator::Validate;

use super::common::{AttendanceRecordResponse, RecordAttendanceRequest};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// POST /attendance
///
/// Student check-in: validates proximity to the fence identified by
/// `fence_code` and records attendance at most once per student per
/// session. The duplicate check happens inside the insert itself, so a
/// double tap or client retry yields one row and one conflict answer.
///
/// ### Responses
/// - `201 Created` → new record id and timestamp
/// - `400 Bad Request` → outside the fence, fence not open, or validation
///   failure
/// - `404 Not Found` → unknown user, or unknown/inactive fence code
/// - `409 Conflict` → attendance already recorded for this fence
/// - `500 Internal Server Error` → storage failure
pub async fn record_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<RecordAttendanceRequest>,
) -> (StatusCode, Json<ApiResponse<AttendanceRecordResponse>>) {
    if let Err(validation_errors) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(format_validation_errors(
                &validation_errors,
            ))),
        );
    }

    match AttendanceRecordModel::record(
        state.db(),
        &claims.user_matric,
        req.fence_code.trim(),
        req.latitude,
        req.longitude,
        Utc::now(),
    )
    .await
    {
        Ok(record) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                AttendanceRecordResponse::from(record),
                "Attendance recorded successfully",
            )),
        ),
        Err(e @ RecordAttendanceError::UserNotFound)
        | Err(e @ RecordAttendanceError::FenceNotFoundOrInactive) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(e.to_string())))
        }
        Err(RecordAttendanceError::OutsideGeofence { distance_m, radius_m }) => {
            tracing::debug!(
                user = %claims.user_matric,
                distance_m,
                radius_m,
                "attendance rejected: outside geofence"
            );
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::error(
                    "User is not within geofence, attendance not recorded",
                )),
            )
        }
        Err(e @ RecordAttendanceError::FenceClosed)
        | Err(e @ RecordAttendanceError::UnsupportedFenceType) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        }
        Err(RecordAttendanceError::AlreadyRecorded) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error(
                "User has already signed attendance for this class",
            )),
        ),
        Err(RecordAttendanceError::Db(e)) => {
            tracing::error!(error = %e, user = %claims.user_matric, "failed to record attendance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("An error occurred. Please retry")),
            )
        }
    }
}
