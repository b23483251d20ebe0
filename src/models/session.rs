use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Genre;

/// Role assigned to accounts created from the client
pub const DEFAULT_ROLE: &str = "USER";

/// Authenticated identity held by the session store
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
    /// Bearer token for protected backend calls
    pub token: String,
    pub refresh_token: Option<String>,
    pub favourite_genres: Vec<Genre>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Builds a session from a successful login payload
    pub fn from_login(response: LoginResponse, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            user_id: response.user_id,
            first_name: response.first_name,
            last_name: response.last_name,
            email: response.email,
            role: response.role,
            token: response.token,
            refresh_token: response.refresh_token.filter(|t| !t.is_empty()),
            favourite_genres: response.favourite_genres,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Generated avatar shown next to the user's name
    pub fn avatar_url(&self) -> String {
        format!("https://ui-avatars.com/api/?name={}", self.first_name)
    }
}

/// Body of POST /login
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful POST /login payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub favourite_genres: Vec<Genre>,
}

/// Body of POST /register
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub favourite_genres: Vec<Genre>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GenreId;

    fn login_response() -> LoginResponse {
        serde_json::from_str(
            r#"{
                "user_id": "u-42",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
                "role": "USER",
                "token": "access",
                "refresh_token": "",
                "favourite_genres": [{"genre_id": 7, "genre_name": "Action"}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_session_from_login() {
        let now = Utc::now();
        let session = Session::from_login(login_response(), now, Duration::hours(24));

        assert_eq!(session.user_id, "u-42");
        assert_eq!(session.token, "access");
        assert_eq!(session.refresh_token, None);
        assert_eq!(session.favourite_genres[0].id, GenreId(7));
        assert_eq!(session.expires_at - session.created_at, Duration::hours(24));
    }

    #[test]
    fn test_session_expiry_boundary() {
        let now = Utc::now();
        let session = Session::from_login(login_response(), now, Duration::seconds(10));

        assert!(!session.is_expired_at(now + Duration::seconds(9)));
        assert!(session.is_expired_at(now + Duration::seconds(10)));
    }

    #[test]
    fn test_avatar_url() {
        let session = Session::from_login(login_response(), Utc::now(), Duration::hours(1));
        assert_eq!(session.avatar_url(), "https://ui-avatars.com/api/?name=Ada");
    }

    #[test]
    fn test_register_request_wire_shape() {
        let request = RegisterRequest {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "secret-pass".to_string(),
            role: DEFAULT_ROLE.to_string(),
            favourite_genres: vec![Genre {
                id: GenreId(1),
                name: "Romance".to_string(),
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["role"], "USER");
        assert_eq!(json["favourite_genres"][0]["genre_id"], 1);
        assert_eq!(json["favourite_genres"][0]["genre_name"], "Romance");
    }
}
