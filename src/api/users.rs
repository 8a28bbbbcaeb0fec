//! `users/*` endpoints: registration, login, session and avatar

use std::path::Path;

use reqwest::Method;
use reqwest::multipart::Form;
use serde::Serialize;

use super::{ApiClient, Result, posts::image_part};
use crate::models::{LoginData, User};

/// Registration payload
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    /// Email address
    pub email: String,
    /// Password
    pub password: String,
    /// Username
    pub username: String,
    /// Role (`USER` unless stated otherwise)
    pub role: String,
}

impl Registration {
    /// Registration for a regular user
    pub fn user(email: &str, username: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
            username: username.trim().to_lowercase(),
            role: "USER".to_string(),
        }
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Create an account. Returns the created user.
    pub async fn register(&self, registration: &Registration) -> Result<User> {
        #[derive(serde::Deserialize)]
        struct Registered {
            user: User,
        }

        let request = self.request(Method::POST, "users/register").json(registration);
        let registered: Registered = self.send(request).await?;
        Ok(registered.user)
    }

    /// Log in and return the token pair and user.
    ///
    /// The token is not stored on `self`; callers decide whether to
    /// persist it and then call [`ApiClient::set_token`].
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginData> {
        let request = self
            .request(Method::POST, "users/login")
            .json(&Credentials {
                username: username.trim(),
                password,
            });
        self.send(request).await
    }

    /// Invalidate the token server-side
    pub async fn logout(&self) -> Result<()> {
        let request = self.authed(Method::POST, "users/logout")?;
        self.send_unit(request).await?;
        Ok(())
    }

    /// The user the token belongs to
    pub async fn current_user(&self) -> Result<User> {
        let request = self.authed(Method::GET, "users/current-user")?;
        self.send(request).await
    }

    /// Replace the avatar with a local image file
    pub async fn update_avatar(&self, path: &Path) -> Result<User> {
        let form = Form::new().part("avatar", image_part(path).await?);
        let request = self.authed(Method::PATCH, "users/avatar")?.multipart(form);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_normalises_username() {
        let reg = Registration::user(" doe@example.com ", " DoeJohn ", "pw");
        assert_eq!(reg.username, "doejohn");
        assert_eq!(reg.email, "doe@example.com");
        assert_eq!(reg.role, "USER");
    }
}
