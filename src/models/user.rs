//! User account model

use serde::{Deserialize, Serialize};

/// Uploaded image reference (avatar, cover image)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// Public URL of the image
    #[serde(default)]
    pub url: String,
    /// Server-side path
    #[serde(default)]
    pub local_path: Option<String>,
}

/// The logged-in user, as returned by login and `users/current-user`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Username (unique handle)
    #[serde(default)]
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar image
    #[serde(default)]
    pub avatar: Option<Avatar>,
    /// Role (`USER` or `ADMIN`)
    #[serde(default)]
    pub role: Option<String>,
    /// Whether the email address has been verified
    #[serde(default)]
    pub is_email_verified: bool,
}

impl User {
    /// Avatar URL if one is set
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar
            .as_ref()
            .map(|a| a.url.as_str())
            .filter(|u| !u.is_empty())
    }
}

/// Account summary embedded in profiles, posts and comments
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    /// User ID (the target of follow requests)
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Username
    #[serde(default)]
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar image
    #[serde(default)]
    pub avatar: Option<Avatar>,
    /// Whether the email address has been verified
    #[serde(default)]
    pub is_email_verified: bool,
}

/// Payload of a successful login
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginData {
    /// Bearer token for subsequent requests
    pub access_token: String,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// The logged-in user
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_payload() {
        let json = r#"{
            "accessToken": "abc",
            "refreshToken": "def",
            "user": {
                "_id": "65f0",
                "avatar": {"url": "https://img/x.png", "localPath": "", "_id": "1"},
                "username": "doejohn",
                "email": "doe@example.com",
                "role": "USER",
                "isEmailVerified": false
            }
        }"#;
        let data: LoginData = serde_json::from_str(json).unwrap();
        assert_eq!(data.access_token, "abc");
        assert_eq!(data.user.username, "doejohn");
        assert_eq!(data.user.avatar_url(), Some("https://img/x.png"));
    }

    #[test]
    fn test_empty_avatar_url_is_none() {
        let user = User {
            avatar: Some(Avatar::default()),
            ..User::default()
        };
        assert_eq!(user.avatar_url(), None);
    }
}
