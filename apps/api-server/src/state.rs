//! Application state - shared across all handlers.

use std::sync::Arc;

use mealboard_core::domain::User;
use mealboard_core::ports::{PasswordService, PostRepository, TokenService, UserRepository};
use mealboard_core::service::{PostService, UserService};
use mealboard_infra::{
    Argon2PasswordService, InMemoryPostRepository, InMemoryUserRepository, JwtTokenService,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;
use crate::middleware::error::{AppError, AppResult};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub user_service: UserService,
    pub post_service: PostService,
    pub tokens: Arc<dyn TokenService>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Self {
        let (users, posts): (Arc<dyn UserRepository>, Arc<dyn PostRepository>) =
            match &config.database {
                Some(db_config) => match mealboard_infra::connect(db_config).await {
                    Ok(conn) => (
                        Arc::new(PostgresUserRepository::new(conn.clone())),
                        Arc::new(PostgresPostRepository::new(conn)),
                    ),
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        Self::in_memory()
                    }
                },
                None => {
                    tracing::warn!(
                        "DATABASE_URL not set. Running without database (in-memory mode)."
                    );
                    Self::in_memory()
                }
            };

        let passwords: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        tracing::info!("Application state initialized");

        Self {
            user_service: UserService::new(users.clone(), passwords),
            post_service: PostService::new(posts.clone()),
            users,
            posts,
            tokens,
        }
    }

    fn in_memory() -> (Arc<dyn UserRepository>, Arc<dyn PostRepository>) {
        let users = Arc::new(InMemoryUserRepository::new());
        let posts = Arc::new(InMemoryPostRepository::new(users.clone()));
        (users, posts)
    }

    /// Resolve an authenticated user id to a live account. Deactivated
    /// accounts hold valid-looking tokens until expiry; they are rejected
    /// here.
    pub async fn require_active(&self, user_id: i64) -> AppResult<User> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }
}
