use db::models::user::Role;
use serde::{Deserialize, Serialize};

/// Decoded JWT claim set. `user_matric` is the canonical identity used for
/// every authorization decision; `sub` carries the email and `username` is
/// display-only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub role: Role,
    pub user_matric: String,
    pub exp: usize,
}

/// The verified caller, produced once by token verification and passed
/// through request extensions as a typed value.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);
