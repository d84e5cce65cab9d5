use api::routes::routes;
use api::state::AppState;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use common::AppConfig;
use db::models::user::{Model as UserModel, Role};
use db::test_utils::setup_test_db;
use serde_json::Value;

pub fn test_config() -> AppConfig {
    AppConfig {
        env: "test".into(),
        project_name: "geoattend-test".into(),
        log_file: "test.log".into(),
        log_to_stdout: false,
        database_path: ":memory:".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "test-secret-not-for-production".into(),
        jwt_duration_minutes: 60,
    }
}

/// Builds the full `/api` router on a fresh in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    let db = setup_test_db().await;
    let state = AppState::new(db, test_config());
    let app = Router::new().nest("/api", routes(state.clone()));
    (app, state)
}

pub async fn seed_admin(state: &AppState, matric: &str, email: &str) -> UserModel {
    UserModel::create(state.db(), matric, "lecturer", email, "password", Role::Admin)
        .await
        .expect("seed admin")
}

pub async fn seed_student(state: &AppState, matric: &str, email: &str) -> UserModel {
    UserModel::create(state.db(), matric, "student", email, "password", Role::Student)
        .await
        .expect("seed student")
}

pub fn bearer_token(state: &AppState, user: &UserModel) -> String {
    let (token, _) = api::auth::generate_jwt(state.config(), user);
    token
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
