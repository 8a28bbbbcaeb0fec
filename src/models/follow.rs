//! Follower / following list entries

use serde::{Deserialize, Serialize};

use super::Avatar;

/// Profile summary attached to a follow-list entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowProfile {
    /// First name
    #[serde(default)]
    pub first_name: String,
    /// Last name
    #[serde(default)]
    pub last_name: String,
    /// Biography
    #[serde(default)]
    pub bio: String,
    /// Date of birth
    #[serde(default)]
    pub dob: Option<String>,
    /// Location
    #[serde(default)]
    pub location: String,
    /// Country calling code
    #[serde(default)]
    pub country_code: String,
}

/// One user in a followers or following list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowEntry {
    /// User ID
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Username
    #[serde(default)]
    pub username: String,
    /// Email address
    #[serde(default)]
    pub email: String,
    /// Avatar
    #[serde(default)]
    pub avatar: Option<Avatar>,
    /// Profile summary
    #[serde(default)]
    pub profile: FollowProfile,
    /// Whether the current user follows this user
    #[serde(default)]
    pub is_following: bool,
}

impl FollowEntry {
    /// First and last name, blank when neither is set
    pub fn full_name(&self) -> String {
        format!("{} {}", self.profile.first_name, self.profile.last_name)
            .trim()
            .to_string()
    }
}
