use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{NewPost, NewUser, Post, PostKind, PostView, User};
use crate::error::RepoError;

/// User repository port.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new account; the store assigns the id.
    async fn insert(&self, user: NewUser) -> Result<User, RepoError>;

    /// Overwrite an existing account record.
    async fn update(&self, user: User) -> Result<User, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// All accounts that have not been deactivated.
    async fn list_active(&self) -> Result<Vec<User>, RepoError>;
}

/// Optional constraints on a post listing. Unset fields are unconstrained.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub kind: Option<PostKind>,
    pub building_code: Option<String>,
    /// Filters on *effective* expiry: the stored flag OR an elapsed
    /// `expires_at`, evaluated at read time.
    pub expired: Option<bool>,
}

impl PostFilter {
    /// Reference semantics for the filter; adapters that push filtering
    /// into the store must agree with this.
    pub fn matches(&self, post: &Post, now: DateTime<Utc>) -> bool {
        if let Some(kind) = self.kind
            && post.kind != kind
        {
            return false;
        }
        if let Some(code) = &self.building_code
            && post.location.building_code != *code
        {
            return false;
        }
        if let Some(expired) = self.expired
            && post.effectively_expired(now) != expired
        {
            return false;
        }
        true
    }
}

/// Post repository port. Reads come back reporter-joined and sorted by
/// `created_at` descending.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post; the store assigns the id.
    async fn insert(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Overwrite an existing post record. `reporter_id` never changes.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<PostView>, RepoError>;

    async fn list(&self, filter: &PostFilter, now: DateTime<Utc>)
    -> Result<Vec<PostView>, RepoError>;

    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<PostView>, RepoError>;

    /// Hard delete. `RepoError::NotFound` when no row matched.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;

    /// Atomically bump `flag_count` and set `is_flagged`; returns the new
    /// count. `RepoError::NotFound` when no row matched.
    async fn increment_flag(&self, id: i64) -> Result<i32, RepoError>;

    /// Settle the stored flag on rows whose `expires_at` has elapsed.
    /// Returns the number of rows updated. Used by the background sweep;
    /// read-time filtering does not depend on it.
    async fn expire_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError>;
}
