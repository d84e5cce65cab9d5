use chrono::{DateTime, NaiveDate, Utc};
use db::models::geofence::{GeofenceStatus, Model as GeofenceModel};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGeofenceRequest {
    #[validate(length(min = 2, max = 60, message = "Name must be 2-60 characters"))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[validate(range(exclusive_min = 0.0, message = "Radius must be greater than zero"))]
    pub radius: f64,

    pub fence_type: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// What an admin gets back from creating a session: the code to share.
#[derive(Debug, Serialize, Default)]
pub struct CreatedGeofenceResponse {
    pub fence_code: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct GeofenceResponse {
    pub id: i64,
    pub fence_code: String,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub radius: f64,
    pub fence_type: String,
    pub start_time: String,
    pub end_time: String,
    pub status: GeofenceStatus,
    pub time_created: String,
    pub creator_matric: String,
}

impl From<GeofenceModel> for GeofenceResponse {
    fn from(m: GeofenceModel) -> Self {
        Self {
            id: m.id,
            fence_code: m.fence_code,
            name: m.name,
            latitude: m.latitude,
            longitude: m.longitude,
            radius: m.radius,
            fence_type: m.fence_type,
            start_time: m.start_time.to_rfc3339(),
            end_time: m.end_time.to_rfc3339(),
            status: m.status,
            time_created: m.time_created.to_rfc3339(),
            creator_matric: m.creator_matric,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// Narrow the listing to one session name.
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeactivateQuery {
    /// UTC calendar date of the session's start.
    pub date: NaiveDate,
}
