//! Social profile model

use serde::{Deserialize, Serialize};

use super::{AccountSummary, Avatar};

/// A social-media profile (own or another user's)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Cover image
    #[serde(default)]
    pub cover_image: Option<Avatar>,
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Free-form biography
    #[serde(default)]
    pub bio: String,
    /// Date of birth (ISO string as sent by the server)
    #[serde(default)]
    pub dob: Option<String>,
    /// Location
    #[serde(default)]
    pub location: String,
    /// Country calling code
    #[serde(default)]
    pub country_code: String,
    /// Phone number
    #[serde(default)]
    pub phone_number: String,
    /// Owning account
    #[serde(default)]
    pub account: AccountSummary,
    /// Number of followers
    #[serde(default)]
    pub followers_count: u32,
    /// Number of accounts followed
    #[serde(default)]
    pub following_count: u32,
    /// Whether the current user follows this profile
    #[serde(default)]
    pub is_following: bool,
}

impl Profile {
    /// Full name, falling back to the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.account.username.clone()
        } else {
            full.to_string()
        }
    }

    /// Date of birth without the time component
    pub fn dob_date(&self) -> Option<&str> {
        self.dob
            .as_deref()
            .map(|d| d.split('T').next().unwrap_or(d))
            .filter(|d| !d.is_empty())
    }

    /// Flip the follow state locally before the server answers
    pub fn toggle_follow(&mut self) {
        self.reconcile_follow(!self.is_following);
    }

    /// Apply the follow state the server reported
    pub fn reconcile_follow(&mut self, following: bool) {
        if following != self.is_following {
            if following {
                self.followers_count = self.followers_count.saturating_add(1);
            } else {
                self.followers_count = self.followers_count.saturating_sub(1);
            }
        }
        self.is_following = following;
    }
}

/// Editable profile fields (`PATCH social-media/profile`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    /// First name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Last name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Biography
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    /// Date of birth (`YYYY-MM-DD`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Country calling code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl ProfileUpdate {
    /// Whether no field would be sent
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> Profile {
        serde_json::from_str(
            r#"{
                "_id": "p1",
                "firstName": "John",
                "lastName": "Doe",
                "bio": "hello",
                "dob": "1990-03-04T00:00:00.000Z",
                "countryCode": "+91",
                "account": {"_id": "u1", "username": "doejohn", "email": "d@e.com"},
                "followersCount": 2,
                "followingCount": 5,
                "isFollowing": false
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_display_name() {
        let mut p = profile();
        assert_eq!(p.display_name(), "John Doe");
        p.first_name.clear();
        p.last_name.clear();
        assert_eq!(p.display_name(), "doejohn");
    }

    #[test]
    fn test_dob_date() {
        assert_eq!(profile().dob_date(), Some("1990-03-04"));
    }

    #[test]
    fn test_follow_toggle_and_reconcile() {
        let mut p = profile();
        p.toggle_follow();
        assert!(p.is_following);
        assert_eq!(p.followers_count, 3);

        // Server agrees: no double count
        p.reconcile_follow(true);
        assert_eq!(p.followers_count, 3);

        // Server disagrees: roll back
        p.reconcile_follow(false);
        assert!(!p.is_following);
        assert_eq!(p.followers_count, 2);
    }

    #[test]
    fn test_follow_count_saturates() {
        let mut p = Profile {
            followers_count: u32::MAX,
            ..Profile::default()
        };
        p.toggle_follow();
        assert_eq!(p.followers_count, u32::MAX);
    }

    #[test]
    fn test_profile_update_skips_unset_fields() {
        let update = ProfileUpdate {
            bio: Some("new bio".to_string()),
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"bio": "new bio"}));
        assert!(ProfileUpdate::default().is_empty());
    }
}
