use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use db::models::attendance_record::Model as AttendanceRecordModel;
use db::models::user::{Model as UserModel, Role};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, Default)]
pub struct UserDetailResponse {
    pub user_matric: String,
    pub username: String,
    pub role: Option<Role>,
    pub attendances: Vec<AttendanceEntry>,
}

#[derive(Debug, Serialize)]
pub struct AttendanceEntry {
    pub geofence_name: String,
    pub timestamp: DateTime<Utc>,
}

/// GET /users/{user_matric}
///
/// Admin view of one user together with their full attendance history.
///
/// ### Responses
/// - `200 OK` → user plus attendance entries (possibly empty)
/// - `404 Not Found` → no such user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_matric): Path<String>,
) -> impl IntoResponse {
    let db = state.db();

    let user = match UserModel::find_by_matric(db, &user_matric).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<UserDetailResponse>::error("User not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, user_matric, "failed to fetch user");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserDetailResponse>::error("Database error")),
            );
        }
    };

    let records = match AttendanceRecordModel::list_for_student(db, &user.user_matric, None).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, user_matric, "failed to fetch attendance history");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserDetailResponse>::error("Database error")),
            );
        }
    };

    let response = UserDetailResponse {
        user_matric: user.user_matric,
        username: user.username,
        role: Some(user.role),
        attendances: records
            .into_iter()
            .map(|r| AttendanceEntry {
                geofence_name: r.geofence_name,
                timestamp: r.timestamp,
            })
            .collect(),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(response, "User fetched successfully")),
    )
}
