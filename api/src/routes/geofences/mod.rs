use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post, put},
};

use crate::auth::guards::{allow_admin, allow_authenticated};
use crate::state::AppState;

mod common;
mod get;
mod post;
mod put;

pub use common::{CreateGeofenceRequest, CreatedGeofenceResponse, GeofenceResponse};
pub use get::{list_geofences, list_my_geofences};
pub use post::create_geofence;
pub use put::deactivate_geofence;

/// The `/geofences` route group.
///
/// Listing is open to any authenticated user; creation, the "mine" view
/// and deactivation are admin-only.
pub fn geofence_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_geofences)
                .route_layer(from_fn_with_state(app_state.clone(), allow_authenticated)),
        )
        .route(
            "/",
            post(create_geofence).route_layer(from_fn_with_state(app_state.clone(), allow_admin)),
        )
        .route(
            "/mine",
            get(list_my_geofences).route_layer(from_fn_with_state(app_state.clone(), allow_admin)),
        )
        .route(
            "/{name}/deactivate",
            put(deactivate_geofence).route_layer(from_fn_with_state(app_state.clone(), allow_admin)),
        )
}
