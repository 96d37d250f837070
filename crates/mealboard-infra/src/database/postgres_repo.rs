//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DbConn, EntityTrait, QueryFilter, QueryOrder,
};

use mealboard_core::domain::{NewPost, NewUser, Post, PostView, User};
use mealboard_core::error::RepoError;
use mealboard_core::ports::{PostFilter, PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

fn query_err(e: sea_orm::DbErr) -> RepoError {
    RepoError::Query(e.to_string())
}

fn save_err(e: sea_orm::DbErr) -> RepoError {
    let err_str = e.to_string();
    if err_str.contains("duplicate") || err_str.contains("unique") {
        RepoError::Constraint("Entity already exists".to_string())
    } else {
        RepoError::Query(err_str)
    }
}

/// PostgreSQL user repository.
pub struct PostgresUserRepository {
    db: DbConn,
}

impl PostgresUserRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .insert(&self.db)
            .await
            .map_err(save_err)?;

        Ok(model.into())
    }

    async fn update(&self, user: User) -> Result<User, RepoError> {
        let model = user::ActiveModel::from(user)
            .update(&self.db)
            .await
            .map_err(save_err)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_active(&self) -> Result<Vec<User>, RepoError> {
        let result = UserEntity::find()
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }
}

/// PostgreSQL post repository. Every read is reporter-joined and sorted
/// newest-first; the expiry filter is pushed into the store as
/// `is_expired OR expires_at <= now`.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn into_view((post, reporter): (post::Model, Option<user::Model>)) -> PostView {
    PostView {
        post: post.into(),
        reporter: reporter.map(Into::into),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(new_post)
            .insert(&self.db)
            .await
            .map_err(save_err)?;

        Ok(model.into())
    }

    async fn update(&self, post_record: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel::from(post_record)
            .update(&self.db)
            .await
            .map_err(save_err)?;

        Ok(model.into())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PostView>, RepoError> {
        let result = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(into_view))
    }

    async fn list(
        &self,
        filter: &PostFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<PostView>, RepoError> {
        let mut query = PostEntity::find().find_also_related(UserEntity);

        if let Some(kind) = filter.kind {
            query = query.filter(post::Column::Kind.eq(post::Kind::from(kind)));
        }
        if let Some(code) = &filter.building_code {
            query = query.filter(post::Column::BuildingCode.eq(code.as_str()));
        }
        if let Some(expired) = filter.expired {
            let elapsed = Condition::any()
                .add(post::Column::IsExpired.eq(true))
                .add(post::Column::ExpiresAt.lte(now));
            query = if expired {
                query.filter(elapsed)
            } else {
                query.filter(elapsed.not())
            };
        }

        let result = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(into_view).collect())
    }

    async fn list_by_reporter(&self, reporter_id: i64) -> Result<Vec<PostView>, RepoError> {
        let result = PostEntity::find()
            .find_also_related(UserEntity)
            .filter(post::Column::ReporterId.eq(reporter_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(into_view).collect())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn increment_flag(&self, id: i64) -> Result<i32, RepoError> {
        // Single-statement increment; concurrent flags cannot lose counts.
        let result = PostEntity::update_many()
            .col_expr(
                post::Column::FlagCount,
                Expr::col(post::Column::FlagCount).add(1),
            )
            .col_expr(post::Column::IsFlagged, Expr::value(true))
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?
            .ok_or(RepoError::NotFound)?;

        Ok(model.flag_count)
    }

    async fn expire_elapsed(&self, now: DateTime<Utc>) -> Result<u64, RepoError> {
        let result = PostEntity::update_many()
            .col_expr(post::Column::IsExpired, Expr::value(true))
            .filter(post::Column::IsExpired.eq(false))
            .filter(post::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.rows_affected)
    }
}
