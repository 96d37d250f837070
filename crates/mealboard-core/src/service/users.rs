//! Account lifecycle: registration, login, profile management and
//! soft-delete. Password hashing is an explicit step here, never a
//! persistence hook, and hashes never leave this module's call graph.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::{NewUser, User};
use crate::error::DomainError;
use crate::ports::{PasswordService, UserRepository};

/// Registration input, pre-hash.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub meal_plan: bool,
    pub receives_notifications: bool,
}

/// Partial profile update. Absent fields keep their prior values; a
/// present password is re-hashed before persisting.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub meal_plan: Option<bool>,
    pub receives_notifications: Option<bool>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
    passwords: Arc<dyn PasswordService>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, passwords: Arc<dyn PasswordService>) -> Self {
        Self { users, passwords }
    }

    /// Register a new account. Duplicate emails are rejected before any
    /// write; the caller renders that as a 400 by convention.
    pub async fn register(&self, input: RegisterInput) -> Result<User, DomainError> {
        validate_names(&input.first_name, &input.last_name)?;
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        if self.users.find_by_email(&input.email).await?.is_some() {
            return Err(DomainError::Duplicate("User already exists".into()));
        }

        let password_hash = self
            .passwords
            .hash(&input.password)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        let user = self
            .users
            .insert(NewUser {
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password_hash,
                meal_plan: input.meal_plan,
                receives_notifications: input.receives_notifications,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials. Unknown email, wrong password and deactivated
    /// account all collapse to the same error; the transport layer
    /// renders a uniform 401.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(DomainError::InvalidCredentials)?;

        if !user.is_active {
            return Err(DomainError::InvalidCredentials);
        }

        let valid = self
            .passwords
            .verify(password, &user.password_hash)
            .map_err(|e| DomainError::Internal(e.to_string()))?;

        if !valid {
            return Err(DomainError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn get(&self, user_id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::NotFound { entity_type: "user", id: user_id })
    }

    /// Merge the supplied fields into the profile. Only present fields
    /// change; an email change must not collide with another account.
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: ProfileUpdate,
    ) -> Result<User, DomainError> {
        let mut user = self.get(user_id).await?;

        if let Some(first_name) = update.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = update.email
            && email != user.email
        {
            validate_email(&email)?;
            if self.users.find_by_email(&email).await?.is_some() {
                return Err(DomainError::Duplicate("User already exists".into()));
            }
            user.email = email;
        }
        if let Some(password) = update.password {
            validate_password(&password)?;
            user.password_hash = self
                .passwords
                .hash(&password)
                .map_err(|e| DomainError::Internal(e.to_string()))?;
        }
        if let Some(meal_plan) = update.meal_plan {
            user.meal_plan = meal_plan;
        }
        if let Some(receives_notifications) = update.receives_notifications {
            user.receives_notifications = receives_notifications;
        }

        Ok(self.users.update(user).await?)
    }

    /// Soft delete: the record stays (as do the account's posts), the
    /// account just stops authenticating.
    pub async fn deactivate(&self, user_id: i64) -> Result<(), DomainError> {
        let mut user = self.get(user_id).await?;
        if user.is_active {
            user.is_active = false;
            self.users.update(user).await?;
            tracing::info!(user_id, "User account deactivated");
        }
        Ok(())
    }

    pub async fn list_active(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.list_active().await?)
    }
}

fn validate_names(first: &str, last: &str) -> Result<(), DomainError> {
    if first.trim().is_empty() || last.trim().is_empty() {
        return Err(DomainError::Validation("First and last name are required".into()));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::Validation("Invalid email address".into()));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.len() < 8 {
        return Err(DomainError::Validation("Password must be at least 8 characters".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicI64, Ordering};

    struct FakeUsers {
        rows: Mutex<Vec<User>>,
        next_id: AtomicI64,
    }

    impl FakeUsers {
        fn new() -> Arc<Self> {
            Arc::new(Self { rows: Mutex::new(Vec::new()), next_id: AtomicI64::new(1) })
        }
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn insert(&self, new_user: NewUser) -> Result<User, RepoError> {
            let user = User {
                id: self.next_id.fetch_add(1, Ordering::SeqCst),
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                email: new_user.email,
                password_hash: new_user.password_hash,
                meal_plan: new_user.meal_plan,
                receives_notifications: new_user.receives_notifications,
                is_active: true,
                created_at: new_user.created_at,
            };
            self.rows.lock().unwrap().push(user.clone());
            Ok(user)
        }

        async fn update(&self, user: User) -> Result<User, RepoError> {
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|u| u.id == user.id)
                .ok_or(RepoError::NotFound)?;
            *row = user.clone();
            Ok(user)
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().find(|u| u.email == email).cloned())
        }

        async fn list_active(&self) -> Result<Vec<User>, RepoError> {
            Ok(self.rows.lock().unwrap().iter().filter(|u| u.is_active).cloned().collect())
        }
    }

    /// Transparent "hash" so tests can assert hashing happened without
    /// pulling the argon2 implementation into the domain crate.
    struct FakeHasher;

    impl PasswordService for FakeHasher {
        fn hash(&self, password: &str) -> Result<String, crate::ports::AuthError> {
            Ok(format!("hashed:{password}"))
        }

        fn verify(&self, password: &str, hash: &str) -> Result<bool, crate::ports::AuthError> {
            Ok(hash == format!("hashed:{password}"))
        }
    }

    fn service() -> (UserService, Arc<FakeUsers>) {
        let repo = FakeUsers::new();
        (UserService::new(repo.clone(), Arc::new(FakeHasher)), repo)
    }

    fn casey() -> RegisterInput {
        RegisterInput {
            first_name: "Casey".into(),
            last_name: "Western".into(),
            email: "casey@example.edu".into(),
            password: "spartans-eat-free".into(),
            meal_plan: true,
            receives_notifications: true,
        }
    }

    #[tokio::test]
    async fn register_hashes_password_before_persisting() {
        let (svc, repo) = service();
        let user = svc.register(casey()).await.unwrap();

        assert_eq!(user.password_hash, "hashed:spartans-eat-free");
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
        assert!(user.is_active);
    }

    #[tokio::test]
    async fn duplicate_email_keeps_a_single_record() {
        let (svc, repo) = service();
        svc.register(casey()).await.unwrap();

        let err = svc.register(casey()).await.unwrap_err();
        assert!(matches!(err, DomainError::Duplicate(_)));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_bad_input() {
        let (svc, _) = service();

        let mut bad_email = casey();
        bad_email.email = "not-an-email".into();
        assert!(matches!(
            svc.register(bad_email).await.unwrap_err(),
            DomainError::Validation(_)
        ));

        let mut short_password = casey();
        short_password.password = "short".into();
        assert!(matches!(
            svc.register(short_password).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn login_failures_are_uniform() {
        let (svc, _) = service();
        svc.register(casey()).await.unwrap();

        assert!(matches!(
            svc.login("nobody@example.edu", "whatever-here").await.unwrap_err(),
            DomainError::InvalidCredentials
        ));
        assert!(matches!(
            svc.login("casey@example.edu", "wrong-password").await.unwrap_err(),
            DomainError::InvalidCredentials
        ));

        let user = svc.login("casey@example.edu", "spartans-eat-free").await.unwrap();
        assert_eq!(user.email, "casey@example.edu");
    }

    #[tokio::test]
    async fn deactivated_account_cannot_login_but_record_survives() {
        let (svc, repo) = service();
        let user = svc.register(casey()).await.unwrap();

        svc.deactivate(user.id).await.unwrap();
        // Idempotent.
        svc.deactivate(user.id).await.unwrap();

        assert!(matches!(
            svc.login("casey@example.edu", "spartans-eat-free").await.unwrap_err(),
            DomainError::InvalidCredentials
        ));
        assert_eq!(repo.rows.lock().unwrap().len(), 1);
        assert!(svc.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn profile_update_merges_present_fields_only() {
        let (svc, _) = service();
        let user = svc.register(casey()).await.unwrap();

        let update = ProfileUpdate {
            first_name: Some("Cassandra".into()),
            meal_plan: Some(false),
            ..Default::default()
        };
        let updated = svc.update_profile(user.id, update).await.unwrap();

        assert_eq!(updated.first_name, "Cassandra");
        assert!(!updated.meal_plan);
        assert_eq!(updated.last_name, "Western");
        assert_eq!(updated.email, "casey@example.edu");
        assert_eq!(updated.password_hash, "hashed:spartans-eat-free");
    }

    #[tokio::test]
    async fn profile_update_rehashes_new_password() {
        let (svc, _) = service();
        let user = svc.register(casey()).await.unwrap();

        let update =
            ProfileUpdate { password: Some("new-password-123".into()), ..Default::default() };
        let updated = svc.update_profile(user.id, update).await.unwrap();

        assert_eq!(updated.password_hash, "hashed:new-password-123");
    }

    #[tokio::test]
    async fn profile_update_rejects_email_collision() {
        let (svc, _) = service();
        svc.register(casey()).await.unwrap();

        let mut other = casey();
        other.email = "other@example.edu".into();
        let other_user = svc.register(other).await.unwrap();

        let update =
            ProfileUpdate { email: Some("casey@example.edu".into()), ..Default::default() };
        assert!(matches!(
            svc.update_profile(other_user.id, update).await.unwrap_err(),
            DomainError::Duplicate(_)
        ));
    }
}
