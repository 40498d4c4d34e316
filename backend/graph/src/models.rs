//! # Social Graph Records
//!
//! Upstream user records and the envelopes they travel in.
//!
//! ## Wire Shape
//! Upstream speaks camelCase JSON. A user looks like:
//!
//! ```json
//! {
//!   "fid": 3,
//!   "displayName": "Dan Romero",
//!   "username": "dwr",
//!   "pfp": { "url": "https://...", "verified": false },
//!   "followerCount": 120,
//!   "followingCount": 80,
//!   "viewerContext": { "following": true, "followedBy": false }
//! }
//! ```
//!
//! Everything but `fid` may be missing depending on the endpoint and on whether
//! there is a viewer, so those fields default.
//!
//! ## Envelopes
//! - List endpoints: `{ "result": { "users": [...] } }`
//! - User endpoints: `{ "result": { "user": {...} } }`
//!
//! Our own routes answer with `{ "result": { "users": [...] } }` for lists and
//! `{ "result": {...} }` for a single user.
use serde::{Deserialize, Serialize};

pub type Fid = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pfp {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub verified: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerContext {
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub followed_by: bool,
    #[serde(default)]
    pub enable_notifications: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bio {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub place_id: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub bio: Bio,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

/// Full upstream user record, as returned by the user endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub fid: Fid,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pfp: Option<Pfp>,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub following_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<Profile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewer_context: Option<ViewerContext>,
}

/// Read-only projection of a [`User`] for lists and search results.
///
/// (De)serializes through the upstream [`User`] shape, so a summary fetched
/// from upstream and re-served by the proxy parses back to the same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "User", into = "User")]
pub struct UserSummary {
    fid: Fid,
    display_name: String,
    username: String,
    avatar_url: Option<String>,
    follower_count: u64,
    following_count: u64,
    is_following: bool,
    is_followed_by: bool,
}

impl UserSummary {
    pub fn fid(&self) -> Fid {
        self.fid
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn follower_count(&self) -> u64 {
        self.follower_count
    }

    pub fn following_count(&self) -> u64 {
        self.following_count
    }

    pub fn is_following(&self) -> bool {
        self.is_following
    }

    pub fn is_followed_by(&self) -> bool {
        self.is_followed_by
    }
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        let viewer = user.viewer_context.unwrap_or_default();

        Self {
            fid: user.fid,
            display_name: user.display_name,
            username: user.username,
            avatar_url: user.pfp.map(|pfp| pfp.url).filter(|url| !url.is_empty()),
            follower_count: user.follower_count,
            following_count: user.following_count,
            is_following: viewer.following,
            is_followed_by: viewer.followed_by,
        }
    }
}

impl From<UserSummary> for User {
    fn from(summary: UserSummary) -> Self {
        Self {
            fid: summary.fid,
            display_name: summary.display_name,
            username: summary.username,
            pfp: summary.avatar_url.map(|url| Pfp {
                url,
                verified: false,
            }),
            follower_count: summary.follower_count,
            following_count: summary.following_count,
            profile: None,
            viewer_context: Some(ViewerContext {
                following: summary.is_following,
                followed_by: summary.is_followed_by,
                enable_notifications: false,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub result: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsersResult {
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResult {
    pub user: User,
}

impl Envelope<UsersResult> {
    pub fn users(users: Vec<UserSummary>) -> Self {
        Self {
            result: UsersResult { users },
        }
    }
}
