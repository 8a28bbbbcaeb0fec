//! Data models for the FreeAPI social-media service

mod comment;
mod follow;
mod page;
mod post;
mod profile;
mod user;

pub use comment::Comment;
pub use follow::{FollowEntry, FollowProfile};
pub use page::Page;
pub use post::{Author, Post, PostImage};
pub use profile::{Profile, ProfileUpdate};
pub use user::{AccountSummary, Avatar, LoginData, User};

use chrono::{DateTime, Utc};

/// Get relative time string (e.g., "5m", "2h", "3d") against a fixed `now`
pub fn relative_time_at(at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(at) = at else {
        return String::from("?");
    };
    let duration = now.signed_duration_since(at);

    if duration.num_seconds() < 60 {
        format!("{}s", duration.num_seconds().max(0))
    } else if duration.num_minutes() < 60 {
        format!("{}m", duration.num_minutes())
    } else if duration.num_hours() < 24 {
        format!("{}h", duration.num_hours())
    } else if duration.num_days() < 7 {
        format!("{}d", duration.num_days())
    } else {
        at.format("%b %d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(relative_time_at(Some(now - Duration::seconds(5)), now), "5s");
        assert_eq!(relative_time_at(Some(now - Duration::minutes(5)), now), "5m");
        assert_eq!(relative_time_at(Some(now - Duration::hours(2)), now), "2h");
        assert_eq!(relative_time_at(Some(now - Duration::days(3)), now), "3d");
        assert_eq!(relative_time_at(None, now), "?");
    }

    #[test]
    fn test_relative_time_clock_skew() {
        let now = Utc::now();
        assert_eq!(relative_time_at(Some(now + Duration::seconds(30)), now), "0s");
    }
}
