use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use db::models::attendance_record::Model as AttendanceRecordModel;
use db::models::geofence::Model as GeofenceModel;

use super::common::{
    AttendanceRecordResponse, MyAttendanceQuery, SessionAttendanceEntry, SessionAttendanceQuery,
};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /attendance/me?course_title=
///
/// A student's own records. With `course_title`, the session name must
/// exist; without it, everything the student has recorded comes back.
///
/// ### Responses
/// - `200 OK` → record list
/// - `404 Not Found` → unknown session name, or no records yet
pub async fn get_my_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<MyAttendanceQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<AttendanceRecordResponse>>>) {
    let db = state.db();

    if let Some(course_title) = &query.course_title {
        match GeofenceModel::list(db, Some(course_title)).await {
            Ok(fences) if fences.is_empty() => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::error("Geofence not found")),
                );
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to check geofence name");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::error("Database error")),
                );
            }
        }
    }

    match AttendanceRecordModel::list_for_student(
        db,
        &claims.user_matric,
        query.course_title.as_deref(),
    )
    .await
    {
        Ok(records) if records.is_empty() => {
            let message = match &query.course_title {
                Some(course) => format!("No attendance records for {course} yet"),
                None => "No attendance records yet".to_string(),
            };
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(message)))
        }
        Ok(records) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                records
                    .into_iter()
                    .map(AttendanceRecordResponse::from)
                    .collect(),
                "Attendance records fetched successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, user = %claims.user_matric, "failed to list attendance");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            )
        }
    }
}

/// GET /attendance?course_title=&date=
///
/// Admin report of everyone recorded for one session on one date. Only the
/// geofence's creator may read it.
///
/// ### Responses
/// - `200 OK` → report rows
/// - `403 Forbidden` → caller did not create this session
/// - `404 Not Found` → no session on that date, or no records yet
pub async fn get_session_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<SessionAttendanceQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<SessionAttendanceEntry>>>) {
    let db = state.db();

    let fence = match GeofenceModel::find_on_day(db, &query.course_title, query.date).await {
        Ok(Some(fence)) => fence,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error(
                    "Geofence doesn't exist for specified course and date. No records",
                )),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up session");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            );
        }
    };

    if fence.creator_matric != claims.user_matric {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error(
                "No permission to view this class attendances, as you're not the creator of the geofence",
            )),
        );
    }

    match AttendanceRecordModel::list_for_session(db, &query.course_title, query.date).await {
        Ok(rows) if rows.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("No attendance records yet")),
        ),
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter()
                    .map(|(record, user)| SessionAttendanceEntry {
                        user_matric: record.user_matric,
                        username: user.map(|u| u.username),
                        timestamp: record.timestamp,
                    })
                    .collect(),
                "Attendance records fetched successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, course = %query.course_title, "failed to list session records");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            )
        }
    }
}
