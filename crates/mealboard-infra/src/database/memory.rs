//! In-memory repositories - used when `DATABASE_URL` is not configured.
//!
//! Data lives in process memory and is lost on restart; id assignment is
//! an atomic counter, the in-memory analogue of the store's
//! auto-increment. Intended for local development and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use mealboard_core::domain::{NewPost, NewUser, Post, PostView, Reporter, User};
use mealboard_core::error::RepoError;
use mealboard_core::ports::{PostFilter, PostRepository, UserRepository};

/// In-memory user store.
pub struct InMemoryUserRepository {
    rows: RwLock<Vec<User>>,
    next_id: AtomicI64,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self { rows: RwLock::new(Vec::new()), next_id: AtomicI64::new(1) }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let user = User {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            meal_plan: user.meal_plan,
            receives_notifications: user.receives_notifications,
            is_active: true,
            created_at: user.created_at,
        };
        rows.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(RepoError::NotFound)?;
        *row = user.clone();
        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.rows.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self.rows.read().await.iter().find(|u| u.email == email).cloned())
    }

    async fn list_active(&self) -> Result<Vec<User>, RepoError> {
        Ok(self
            .rows
            .read()
            .await
            .iter()
            .filter(|u| u.is_active)
            .cloned()
            .collect())
    }
}

/// In-memory post store. Joins the reporter against the user store the
/// same way the Postgres adapter joins against the `users` table.
pub struct InMemoryPostRepository {
    rows: RwLock<Vec<Post>>,
    next_id: AtomicI64,
    users: Arc<InMemoryUserRepository>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<InMemoryUserRepository>) -> Self {
        Self { rows: RwLock::new(Vec::new()), next_id: AtomicI64::new(1), users }
    }

    async fn reporter(&self, reporter_id: i64) -> Option<Reporter> {
        let users = self.users.rows.read().await;
        users.iter().find(|u| u.id == reporter_id).map(|u| Reporter {
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
        })
    }

    async fn view(&self, post: Post) -> PostView {
        let reporter = self.reporter(post.reporter_id).await;
        PostView { post, reporter }
    }

    async fn views(&self, mut posts: Vec<Post>) -> Vec<PostView> {
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let mut out = Vec::with_capacity(posts.len());
        for post in posts {
            out.push(self.view(post).await);
        }
        out
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let post = Post {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            kind: new_post.kind,
            title: new_post.title,
            description: new_post.description,
            location: new_post.location,
            reporter_id: new_post.reporter_id,
            created_at: new_post.created_at,
            expires_at: new_post.expires_at,
            is_expired: false,
            is_flagged: false,
            flag_count: 0,
        };
        self.rows.write().await.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *row = post.clone();
        Ok(post)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostView>, RepoError> {
        let found = self.rows.read().await.iter().find(|p| p.id == id).cloned();
        match found {
            Some(post) => Ok(Some(self.view(post).await)),
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostView>, RepoError> {
        let matched: Vec<_> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| filter.matches(p, now))
            .cloned()
            .collect();
        Ok(self.views(matched).await)
    }

    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<PostView>, RepoError> {
        let matched: Vec<_> = self
            .rows
            .read()
            .await
            .iter()
            .filter(|p| p.reporter_id == reporter_id)
            .cloned()
            .collect();
        Ok(self.views(matched).await)
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut rows = self.rows.write().await;
        let before = rows.len();
        rows.retain(|p| p.id != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn increment_flag(&self, id: i64) -> Result<i32, RepoError> {
        let mut rows = self.rows.write().await;
        let row = rows.iter_mut().find(|p| p.id == id).ok_or(RepoError::NotFound)?;
        row.flag_count += 1;
        row.is_flagged = true;
        Ok(row.flag_count)
    }

    async fn expire_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let mut rows = self.rows.write().await;
        let mut settled = 0;
        for row in rows.iter_mut().filter(|p| !p.is_expired && p.expires_at <= now) {
            row.is_expired = true;
            settled += 1;
        }
        Ok(settled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use mealboard_core::domain::{Location, PostKind};

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Casey".into(),
            last_name: "Western".into(),
            email: email.into(),
            password_hash: "hash".into(),
            meal_plan: false,
            receives_notifications: true,
            created_at: Utc::now(),
        }
    }

    fn new_post(reporter_id: i64, expires_in: Duration) -> NewPost {
        NewPost {
            kind: PostKind::FreeFood,
            title: "Pizza".into(),
            description: None,
            location: Location { building_code: "KSL".into(), lat: 41.5, lng: -81.6 },
            reporter_id,
            created_at: Utc::now(),
            expires_at: Utc::now() + expires_in,
        }
    }

    #[tokio::test]
    async fn ids_are_strictly_increasing_and_never_reused() {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = InMemoryPostRepository::new(users.clone());

        let first = posts.insert(new_post(1, Duration::hours(1))).await.unwrap();
        let second = posts.insert(new_post(1, Duration::hours(1))).await.unwrap();
        assert!(second.id > first.id);

        posts.delete(second.id).await.unwrap();
        let third = posts.insert(new_post(1, Duration::hours(1))).await.unwrap();
        assert!(third.id > second.id);
    }

    #[tokio::test]
    async fn duplicate_email_hits_the_unique_constraint() {
        let users = InMemoryUserRepository::new();
        users.insert(new_user("casey@example.edu")).await.unwrap();

        let err = users.insert(new_user("casey@example.edu")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn reads_join_the_reporter_identity() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = users.insert(new_user("casey@example.edu")).await.unwrap();

        let posts = InMemoryPostRepository::new(users.clone());
        let post = posts.insert(new_post(user.id, Duration::hours(1))).await.unwrap();

        let view = posts.find_by_id(post.id).await.unwrap().unwrap();
        let reporter = view.reporter.unwrap();
        assert_eq!(reporter.email, "casey@example.edu");
        assert_eq!(reporter.first_name, "Casey");
    }

    #[tokio::test]
    async fn expired_filter_matches_postgres_semantics() {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = InMemoryPostRepository::new(users);

        let stale = posts.insert(new_post(1, Duration::hours(-1))).await.unwrap();
        posts.insert(new_post(1, Duration::hours(1))).await.unwrap();

        let filter = PostFilter { expired: Some(true), ..Default::default() };
        let expired = posts.list(&filter, Utc::now()).await.unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].post.id, stale.id);
    }
}
