use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::format_validation_errors;
use db::models::user::{Model as UserModel, Role};
use sea_orm::SqlErr;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use crate::state::AppState;

lazy_static::lazy_static! {
    static ref MATRIC_REGEX: regex::Regex =
        regex::Regex::new("^[A-Za-z0-9][A-Za-z0-9/._-]{2,48}$").unwrap();
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(regex(
        path = *MATRIC_REGEX,
        message = "Matric number must be 3-49 characters: letters, digits, '/', '.', '_' or '-'"
    ))]
    pub user_matric: String,

    #[validate(length(min = 2, max = 60, message = "Username must be 2-60 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    pub role: Role,
}

#[derive(Debug, Serialize, Default)]
pub struct UserResponse {
    pub id: i64,
    pub user_matric: String,
    pub username: String,
    pub email: String,
    pub role: Option<Role>,
    pub token: String,
    pub expires_at: String,
}

impl UserResponse {
    fn from_user(user: &UserModel, token: String, expires_at: String) -> Self {
        Self {
            id: user.id,
            user_matric: user.user_matric.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: Some(user.role),
            token,
            expires_at,
        }
    }
}

/// POST /auth/register
///
/// Register a new user and issue a JWT immediately.
///
/// ### Responses
/// - `201 Created` → user payload plus token
/// - `400 Bad Request` → validation failure
/// - `409 Conflict` → email or matric already registered
/// - `500 Internal Server Error` → storage failure
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<UserResponse>::error(error_message)),
        );
    }

    match UserModel::create(
        state.db(),
        &req.user_matric,
        &req.username,
        &req.email,
        &req.password,
        req.role,
    )
    .await
    {
        Ok(user) => {
            let (token, expiry) = generate_jwt(state.config(), &user);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    UserResponse::from_user(&user, token, expiry),
                    "User registered successfully",
                )),
            )
        }
        Err(e) => {
            if let Some(SqlErr::UniqueConstraintViolation(msg)) = e.sql_err() {
                let message = if msg.contains("users.email") {
                    "A user with this email already exists"
                } else {
                    "A user with this matric number already exists"
                };
                return (
                    StatusCode::CONFLICT,
                    Json(ApiResponse::<UserResponse>::error(message)),
                );
            }

            tracing::error!(error = %e, "failed to register user");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error(format!(
                    "Database error: {}",
                    e
                ))),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address or matric number.
    pub identifier: String,
    pub password: String,
}

/// POST /auth/login
///
/// Authenticate an existing user by email or matric number and issue a JWT.
///
/// ### Responses
/// - `200 OK` → user payload plus token
/// - `404 Not Found` → no account for the identifier
/// - `401 Unauthorized` → wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = match UserModel::find_by_identifier(state.db(), &req.identifier).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<UserResponse>::error("User not registered yet")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to look up user at login");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<UserResponse>::error("Database error")),
            );
        }
    };

    if !user.verify_password(&req.password) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<UserResponse>::error(
                "Email or password incorrect",
            )),
        );
    }

    let (token, expiry) = generate_jwt(state.config(), &user);
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            UserResponse::from_user(&user, token, expiry),
            "Login successful",
        )),
    )
}
