use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use db::models::geofence::Model as GeofenceModel;

use super::common::{GeofenceResponse, ListQuery};
use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;

/// GET /geofences?name=
///
/// All geofences, optionally narrowed to one session name. Open to any
/// authenticated user: students need the list to find their class.
///
/// ### Responses
/// - `200 OK` → geofence list
/// - `404 Not Found` → nothing matched
pub async fn list_geofences(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<GeofenceResponse>>>) {
    match GeofenceModel::list(state.db(), query.name.as_deref()).await {
        Ok(fences) if fences.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("No geofences found")),
        ),
        Ok(fences) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                fences.into_iter().map(GeofenceResponse::from).collect(),
                "Geofences fetched successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list geofences");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            )
        }
    }
}

/// GET /geofences/mine?name=
///
/// Geofences created by the calling admin.
///
/// ### Responses
/// - `200 OK` → geofence list
/// - `404 Not Found` → the caller has not created any matching geofence
pub async fn list_my_geofences(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> (StatusCode, Json<ApiResponse<Vec<GeofenceResponse>>>) {
    match GeofenceModel::list_created_by(state.db(), &claims.user_matric, query.name.as_deref())
        .await
    {
        Ok(fences) if fences.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("No geofences have been created by you yet")),
        ),
        Ok(fences) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                fences.into_iter().map(GeofenceResponse::from).collect(),
                "Geofences fetched successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "failed to list created geofences");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            )
        }
    }
}
