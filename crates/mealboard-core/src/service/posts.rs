//! Post lifecycle manager: create/read/update/delete/flag/expire with
//! ownership checks, over the [`PostRepository`] port.

use std::sync::Arc;

use chrono::{Local, Utc};

use crate::domain::{Post, PostView};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostFilter, PostRepository};
use crate::validate::{self, PostInput, PostPatch, PostUpdate};

/// Post lifecycle operations. Every read comes back reporter-joined.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// Validate, normalize and persist a new post for `reporter_id`.
    /// Nothing is written when validation fails.
    pub async fn create(&self, reporter_id: i64, input: PostInput) -> Result<PostView, DomainError> {
        let new_post = validate::normalize_new_post(reporter_id, input, Local::now())?;
        let post = self.posts.insert(new_post).await?;

        tracing::info!(post_id = post.id, reporter_id, kind = post.kind.as_str(), "Post created");

        // Re-read for the reporter join.
        self.posts
            .find_by_id(post.id)
            .await?
            .ok_or(DomainError::NotFound { entity_type: "post", id: post.id })
    }

    /// All posts matching `filter`, newest first.
    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<PostView>, DomainError> {
        Ok(self.posts.list(filter, Utc::now()).await?)
    }

    pub async fn get(&self, post_id: i64) -> Result<PostView, DomainError> {
        self.posts
            .find_by_id(post_id)
            .await?
            .ok_or(DomainError::NotFound { entity_type: "post", id: post_id })
    }

    /// Apply a partial update. Only the caller who created the post may
    /// change it; fields absent from `update` keep their prior values.
    pub async fn update(
        &self,
        user_id: i64,
        post_id: i64,
        update: PostUpdate,
    ) -> Result<PostView, DomainError> {
        let view = self.owned(user_id, post_id).await?;
        let patch = validate::normalize_update(update, Local::now())?;

        let mut post = view.post;
        apply_patch(&mut post, patch);
        let post = self.posts.update(post).await?;

        Ok(PostView { post, reporter: view.reporter })
    }

    /// Ownership-checked hard delete.
    pub async fn delete(&self, user_id: i64, post_id: i64) -> Result<(), DomainError> {
        self.owned(user_id, post_id).await?;
        self.posts.delete(post_id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound { entity_type: "post", id: post_id },
            other => other.into(),
        })?;

        tracing::info!(post_id, user_id, "Post deleted");
        Ok(())
    }

    /// Anyone may flag a post, the reporter included. Returns the new
    /// flag count.
    pub async fn flag(&self, post_id: i64) -> Result<i32, DomainError> {
        let count = self.posts.increment_flag(post_id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound { entity_type: "post", id: post_id },
            other => other.into(),
        })?;

        tracing::info!(post_id, flag_count = count, "Post flagged");
        Ok(count)
    }

    /// Ownership-checked expiry. Idempotent: expiring an already expired
    /// post is not an error. A post never returns to active.
    pub async fn expire(&self, user_id: i64, post_id: i64) -> Result<(), DomainError> {
        let view = self.owned(user_id, post_id).await?;

        let mut post = view.post;
        if !post.is_expired {
            post.is_expired = true;
            self.posts.update(post).await?;
        }
        Ok(())
    }

    /// Every post created by `reporter_id`, newest first.
    pub async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<PostView>, DomainError> {
        Ok(self.posts.list_by_reporter(reporter_id).await?)
    }

    async fn owned(&self, user_id: i64, post_id: i64) -> Result<PostView, DomainError> {
        let view = self.get(post_id).await?;
        if view.post.reporter_id != user_id {
            return Err(DomainError::Forbidden);
        }
        Ok(view)
    }
}

fn apply_patch(post: &mut Post, patch: PostPatch) {
    if let Some(title) = patch.title {
        post.title = title;
    }
    if let Some(description) = patch.description {
        post.description = description;
    }
    if let Some(location) = patch.location {
        post.location = location;
    }
    if let Some(expires_at) = patch.expires_at {
        post.expires_at = expires_at;
    }
    if let Some(is_expired) = patch.is_expired {
        post.is_expired = is_expired;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewPost, PostKind, Reporter};
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// In-memory stand-in for the post store, joined against a single
    /// fake reporter.
    struct FakePosts {
        rows: Mutex<Vec<Post>>,
        next_id: AtomicI64,
    }

    impl FakePosts {
        fn new() -> Arc<Self> {
            Arc::new(Self { rows: Mutex::new(Vec::new()), next_id: AtomicI64::new(1) })
        }

        fn reporter() -> Reporter {
            Reporter {
                first_name: "Casey".into(),
                last_name: "Western".into(),
                email: "casey@example.edu".into(),
            }
        }

        fn view(post: Post) -> PostView {
            PostView { post, reporter: Some(Self::reporter()) }
        }
    }

    #[async_trait]
    impl PostRepository for FakePosts {
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
            self.rows.lock().unwrap().push(post.clone());
            Ok(post)
        }

        async fn update(&self, post: Post) -> Result<Post, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|p| p.id == post.id)
                .ok_or(RepoError::NotFound)?;
            *row = post.clone();
            Ok(post)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<PostView>, RepoError> {
            let rows = self.rows.lock().unwrap();
            Ok(rows.iter().find(|p| p.id == id).cloned().map(Self::view))
        }

        async fn list(
            &self,
            filter: &PostFilter,
            now: DateTime<Utc>,
        ) -> Result<Vec<PostView>, RepoError> {
            let rows = self.rows.lock().unwrap();
            let mut matched: Vec<_> =
                rows.iter().filter(|p| filter.matches(p, now)).cloned().collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(matched.into_iter().map(Self::view).collect())
        }

        async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<PostView>, RepoError> {
            let rows = self.rows.lock().unwrap();
            let mut matched: Vec<_> =
                rows.iter().filter(|p| p.reporter_id == reporter_id).cloned().collect();
            matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
            Ok(matched.into_iter().map(Self::view).collect())
        }

        async fn delete(&self, id: i64) -> Result<(), RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let before = rows.len();
            rows.retain(|p| p.id != id);
            if rows.len() == before {
                return Err(RepoError::NotFound);
            }
            Ok(())
        }

        async fn increment_flag(&self, id: i64) -> Result<i32, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|p| p.id == id).ok_or(RepoError::NotFound)?;
            row.flag_count += 1;
            row.is_flagged = true;
            Ok(row.flag_count)
        }

        async fn expire_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let mut settled = 0;
            for row in rows.iter_mut().filter(|p| !p.is_expired && p.expires_at <= now) {
                row.is_expired = true;
                settled += 1;
            }
            Ok(settled)
        }
    }

    fn service() -> (PostService, Arc<FakePosts>) {
        let repo = FakePosts::new();
        (PostService::new(repo.clone()), repo)
    }

    fn pizza_input() -> PostInput {
        PostInput {
            kind: PostKind::FreeFood,
            title: "Pizza".into(),
            description: Some("Half a pepperoni left".into()),
            building_code: "KSL".into(),
            expires_at: (Utc::now() + Duration::hours(1)).to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn create_copies_directory_coordinates_and_defaults() {
        let (svc, _) = service();

        let view = svc.create(1, pizza_input()).await.unwrap();
        let post = view.post;

        let ksl = crate::domain::building::resolve("KSL").unwrap();
        assert_eq!(post.location.lat, ksl.lat);
        assert_eq!(post.location.lng, ksl.lng);
        assert_eq!(post.reporter_id, 1);
        assert!(!post.is_expired);
        assert!(!post.is_flagged);
        assert_eq!(post.flag_count, 0);
        assert!(view.reporter.is_some());
    }

    #[tokio::test]
    async fn create_with_unknown_building_persists_nothing() {
        let (svc, repo) = service();

        let mut input = pizza_input();
        input.building_code = "ZZZZ".into();

        let err = svc.create(1, input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(repo.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn created_post_round_trips_through_get() {
        let (svc, _) = service();

        let created = svc.create(1, pizza_input()).await.unwrap().post;
        let fetched = svc.get(created.id).await.unwrap().post;

        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.description, created.description);
        assert_eq!(fetched.location, created.location);
        assert_eq!(fetched.expires_at, created.expires_at);
    }

    #[tokio::test]
    async fn get_missing_post_is_not_found() {
        let (svc, _) = service();
        let err = svc.get(99).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { id: 99, .. }));
    }

    #[tokio::test]
    async fn list_filters_by_kind_newest_first() {
        let (svc, _) = service();

        svc.create(1, pizza_input()).await.unwrap();
        let mut swipe = pizza_input();
        swipe.kind = PostKind::MealSwipe;
        swipe.title = "Swipe at Leutner".into();
        let swipe_post = svc.create(1, swipe).await.unwrap().post;

        let filter = PostFilter { kind: Some(PostKind::MealSwipe), ..Default::default() };
        let listed = svc.list(&filter).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].post.id, swipe_post.id);

        let all = svc.list(&PostFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        // Ties on created_at fall back to id order, newest insert first.
        assert!(all[0].post.id > all[1].post.id);
    }

    #[tokio::test]
    async fn list_expired_filter_uses_derived_state() {
        let (svc, _) = service();

        // Stored flag still false, but expires_at already elapsed. The
        // derived state wins; this is the documented resolution of the
        // stored-vs-elapsed ambiguity.
        let mut stale = pizza_input();
        stale.expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let stale_post = svc.create(1, stale).await.unwrap().post;
        assert!(!stale_post.is_expired);

        let fresh_post = svc.create(1, pizza_input()).await.unwrap().post;

        let active = svc
            .list(&PostFilter { expired: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].post.id, fresh_post.id);

        let expired = svc
            .list(&PostFilter { expired: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].post.id, stale_post.id);
    }

    #[tokio::test]
    async fn update_by_non_owner_is_forbidden_and_changes_nothing() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;

        let update = PostUpdate { title: Some("Hijacked".into()), ..Default::default() };
        let err = svc.update(2, post.id, update).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));

        let unchanged = svc.get(post.id).await.unwrap().post;
        assert_eq!(unchanged.title, "Pizza");
    }

    #[tokio::test]
    async fn update_merges_only_present_fields() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;

        let update = PostUpdate {
            title: Some("Cold pizza".into()),
            building_code: Some("THW".into()),
            ..Default::default()
        };
        let updated = svc.update(1, post.id, update).await.unwrap().post;

        assert_eq!(updated.title, "Cold pizza");
        assert_eq!(updated.location.building_code, "THW");
        // Untouched fields survive.
        assert_eq!(updated.description, post.description);
        assert_eq!(updated.expires_at, post.expires_at);
        assert_eq!(updated.reporter_id, 1);
    }

    #[tokio::test]
    async fn update_can_clear_description_with_empty_string() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;
        assert!(post.description.is_some());

        let update = PostUpdate { description: Some("".into()), ..Default::default() };
        let updated = svc.update(1, post.id, update).await.unwrap().post;
        assert_eq!(updated.description, None);
    }

    #[tokio::test]
    async fn delete_by_non_owner_leaves_post_retrievable() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;

        let err = svc.delete(2, post.id).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden));
        assert!(svc.get(post.id).await.is_ok());

        svc.delete(1, post.id).await.unwrap();
        assert!(matches!(
            svc.get(post.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn flag_increments_by_one_per_call_for_any_caller() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;

        assert_eq!(svc.flag(post.id).await.unwrap(), 1);
        assert_eq!(svc.flag(post.id).await.unwrap(), 2);
        assert_eq!(svc.flag(post.id).await.unwrap(), 3);

        let flagged = svc.get(post.id).await.unwrap().post;
        assert!(flagged.is_flagged);
        assert_eq!(flagged.flag_count, 3);
    }

    #[tokio::test]
    async fn flag_missing_post_is_not_found() {
        let (svc, _) = service();
        assert!(matches!(
            svc.flag(42).await.unwrap_err(),
            DomainError::NotFound { id: 42, .. }
        ));
    }

    #[tokio::test]
    async fn expire_is_owner_only_and_idempotent() {
        let (svc, _) = service();
        let post = svc.create(1, pizza_input()).await.unwrap().post;

        assert!(matches!(svc.expire(2, post.id).await.unwrap_err(), DomainError::Forbidden));

        svc.expire(1, post.id).await.unwrap();
        assert!(svc.get(post.id).await.unwrap().post.is_expired);

        // Second expire is a no-op, not an error.
        svc.expire(1, post.id).await.unwrap();
        assert!(svc.get(post.id).await.unwrap().post.is_expired);
    }

    #[tokio::test]
    async fn list_by_reporter_only_returns_own_posts() {
        let (svc, _) = service();
        svc.create(1, pizza_input()).await.unwrap();
        svc.create(2, pizza_input()).await.unwrap();
        svc.create(1, pizza_input()).await.unwrap();

        let mine = svc.list_by_reporter(1).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|v| v.post.reporter_id == 1));
    }

    #[tokio::test]
    async fn expire_elapsed_settles_only_stale_rows() {
        let (svc, repo) = service();

        let mut stale = pizza_input();
        stale.expires_at = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let stale_post = svc.create(1, stale).await.unwrap().post;
        let fresh_post = svc.create(1, pizza_input()).await.unwrap().post;

        let settled = repo.expire_elapsed(Utc::now()).await.unwrap();
        assert_eq!(settled, 1);
        assert!(svc.get(stale_post.id).await.unwrap().post.is_expired);
        assert!(!svc.get(fresh_post.id).await.unwrap().post.is_expired);

        // Already settled rows are not counted again.
        assert_eq!(repo.expire_elapsed(Utc::now()).await.unwrap(), 0);
    }
}
