use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a post is offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostKind {
    FreeFood,
    MealSwipe,
}

impl PostKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostKind::FreeFood => "FreeFood",
            PostKind::MealSwipe => "MealSwipe",
        }
    }
}

impl std::str::FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FreeFood" => Ok(PostKind::FreeFood),
            "MealSwipe" => Ok(PostKind::MealSwipe),
            other => Err(format!("Unknown post kind: {other}")),
        }
    }
}

/// Where the food is. The building code is validated against the Building
/// Directory and the coordinates are always the directory's, never the
/// client's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub building_code: String,
    pub lat: f64,
    pub lng: f64,
}

/// Post entity - a notice about free food or an available meal swipe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub location: Location,
    /// Owning user. Immutable after creation.
    pub reporter_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_expired: bool,
    pub is_flagged: bool,
    pub flag_count: i32,
}

impl Post {
    /// A post is effectively expired once the owner flipped the flag or
    /// the expiration instant has passed, whichever comes first. Read-side
    /// filtering uses this, not the stored flag alone.
    pub fn effectively_expired(&self, now: DateTime<Utc>) -> bool {
        self.is_expired || now > self.expires_at
    }
}

/// A validated, normalized post payload ready for persistence.
/// Produced only by [`crate::validate::normalize_new_post`].
#[derive(Debug, Clone)]
pub struct NewPost {
    pub kind: PostKind,
    pub title: String,
    pub description: Option<String>,
    pub location: Location,
    pub reporter_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Reporter identity joined into post reads. Never carries the password
/// hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reporter {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// A post together with its reporter's public identity.
#[derive(Debug, Clone)]
pub struct PostView {
    pub post: Post,
    pub reporter: Option<Reporter>,
}
