use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use db::models::geofence::{DeactivateGeofenceError, Model as GeofenceModel};

use super::common::DeactivateQuery;
use crate::auth::AuthUser;
use crate::auth::guards::Empty;
use crate::response::ApiResponse;
use crate::state::AppState;

/// PUT /geofences/{name}/deactivate?date=
///
/// Manually close the session with the given name on the given UTC start
/// date. Creator-only; `inactive` is terminal.
///
/// ### Responses
/// - `200 OK` → deactivated
/// - `400 Bad Request` → already inactive
/// - `403 Forbidden` → caller is not the creator
/// - `404 Not Found` → no session with that name on that date
pub async fn deactivate_geofence(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<DeactivateQuery>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> (StatusCode, Json<ApiResponse<Empty>>) {
    match GeofenceModel::deactivate(state.db(), &claims.user_matric, &name, query.date).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                Empty,
                format!("Successfully deactivated geofence {} for {}", name, query.date),
            )),
        ),
        Err(e @ DeactivateGeofenceError::NotFound) => {
            (StatusCode::NOT_FOUND, Json(ApiResponse::error(e.to_string())))
        }
        Err(e @ DeactivateGeofenceError::AlreadyInactive) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.to_string())))
        }
        Err(e @ DeactivateGeofenceError::Forbidden) => {
            (StatusCode::FORBIDDEN, Json(ApiResponse::error(e.to_string())))
        }
        Err(DeactivateGeofenceError::Db(e)) => {
            tracing::error!(error = %e, name, "failed to deactivate geofence");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Internal error. Please try again")),
            )
        }
    }
}
