pub mod claims;
pub mod extractors;
pub mod guards;
pub mod middleware;

pub use claims::{AuthUser, Claims};

use chrono::{Duration, Utc};
use common::AppConfig;
use jsonwebtoken::{EncodingKey, Header, encode};

/// Generates a JWT and its expiry timestamp for a given user.
///
/// The signing secret and token lifetime come from the configuration
/// handed in at startup, never from the process environment.
pub fn generate_jwt(config: &AppConfig, user: &db::models::user::Model) -> (String, String) {
    let expiry = Utc::now() + Duration::minutes(config.jwt_duration_minutes as i64);

    let claims = Claims {
        sub: user.email.clone(),
        username: user.username.clone(),
        role: user.role,
        user_matric: user.user_matric.clone(),
        exp: expiry.timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .expect("Token encoding failed");

    (token, expiry.to_rfc3339())
}
