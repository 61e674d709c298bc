use serde::{Deserialize, Serialize};

use crate::store::{Role, User};

/// Request body for both login endpoints.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Role-scoped profile returned to the client. Never carries the password.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serialization() {
        let user = PublicUser {
            email: "admin@test.com".into(),
            role: Role::Admin,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("admin@test.com"));
        assert!(json.contains("\"role\":\"Admin\""));
    }
}
