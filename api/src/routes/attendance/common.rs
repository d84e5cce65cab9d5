use chrono::{DateTime, NaiveDate, Utc};
use db::models::attendance_record::Model as AttendanceRecordModel;
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordAttendanceRequest {
    #[validate(length(min = 1, message = "Fence code is required"))]
    pub fence_code: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,
}

#[derive(Debug, Serialize, Default)]
pub struct AttendanceRecordResponse {
    pub id: i64,
    pub user_matric: String,
    pub fence_code: String,
    pub geofence_name: String,
    pub timestamp: String,
}

impl From<AttendanceRecordModel> for AttendanceRecordResponse {
    fn from(m: AttendanceRecordModel) -> Self {
        Self {
            id: m.id,
            user_matric: m.user_matric,
            fence_code: m.fence_code,
            geofence_name: m.geofence_name,
            timestamp: m.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MyAttendanceQuery {
    pub course_title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionAttendanceQuery {
    pub course_title: String,
    /// UTC calendar date of the session's start.
    pub date: NaiveDate,
}

/// One row of the admin's per-session report.
#[derive(Debug, Serialize)]
pub struct SessionAttendanceEntry {
    pub user_matric: String,
    pub username: Option<String>,
    pub timestamp: DateTime<Utc>,
}
