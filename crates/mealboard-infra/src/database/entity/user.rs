//! User entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use mealboard_core::domain::{NewUser, Reporter, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub meal_plan: bool,
    pub receives_notifications: bool,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post::Entity")]
    Post,
}

impl Related<super::post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Post.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain User.
impl From<Model> for User {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            password_hash: model.password_hash,
            meal_plan: model.meal_plan,
            receives_notifications: model.receives_notifications,
            is_active: model.is_active,
            created_at: model.created_at.into(),
        }
    }
}

/// The reporter join carries only the public identity.
impl From<Model> for Reporter {
    fn from(model: Model) -> Self {
        Self {
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
        }
    }
}

/// New accounts leave the id to the store's auto-increment.
impl From<NewUser> for ActiveModel {
    fn from(user: NewUser) -> Self {
        Self {
            id: NotSet,
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            meal_plan: Set(user.meal_plan),
            receives_notifications: Set(user.receives_notifications),
            is_active: Set(true),
            created_at: Set(user.created_at.into()),
        }
    }
}

/// Full-row overwrite for updates.
impl From<User> for ActiveModel {
    fn from(user: User) -> Self {
        Self {
            id: Set(user.id),
            first_name: Set(user.first_name),
            last_name: Set(user.last_name),
            email: Set(user.email),
            password_hash: Set(user.password_hash),
            meal_plan: Set(user.meal_plan),
            receives_notifications: Set(user.receives_notifications),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at.into()),
        }
    }
}
