use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User entity - represents an account on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub meal_plan: bool,
    pub receives_notifications: bool,
    /// Soft-delete marker: deactivated accounts keep their record (and
    /// their posts) but can no longer authenticate.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A new account ready for persistence; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub meal_plan: bool,
    pub receives_notifications: bool,
    pub created_at: DateTime<Utc>,
}
