use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for signup. Every field is required; a missing one fails
/// at extraction before the store is touched.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub bio: String,
    pub image_url: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Public part of the user returned to the client. No hash, no
/// timestamps, no recipe list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub bio: Option<String>,
    pub image_url: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            bio: user.bio,
            image_url: user.image_url,
        }
    }
}
