//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use mealboard_core::domain::{Location, NewPost, Post, PostKind};

/// Stored post kind. Mirrors the domain's closed enumeration; the wire
/// strings double as the column values.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Kind {
    #[sea_orm(string_value = "FreeFood")]
    FreeFood,
    #[sea_orm(string_value = "MealSwipe")]
    MealSwipe,
}

impl From<PostKind> for Kind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::FreeFood => Kind::FreeFood,
            PostKind::MealSwipe => Kind::MealSwipe,
        }
    }
}

impl From<Kind> for PostKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::FreeFood => PostKind::FreeFood,
            Kind::MealSwipe => PostKind::MealSwipe,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub kind: Kind,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub building_code: String,
    pub lat: f64,
    pub lng: f64,
    pub reporter_id: i64,
    pub created_at: DateTimeWithTimeZone,
    pub expires_at: DateTimeWithTimeZone,
    pub is_expired: bool,
    pub is_flagged: bool,
    pub flag_count: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::ReporterId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from SeaORM Model to Domain Post.
impl From<Model> for Post {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind.into(),
            title: model.title,
            description: model.description,
            location: Location {
                building_code: model.building_code,
                lat: model.lat,
                lng: model.lng,
            },
            reporter_id: model.reporter_id,
            created_at: model.created_at.into(),
            expires_at: model.expires_at.into(),
            is_expired: model.is_expired,
            is_flagged: model.is_flagged,
            flag_count: model.flag_count,
        }
    }
}

/// New posts leave the id to the store's auto-increment and start in the
/// default lifecycle state.
impl From<NewPost> for ActiveModel {
    fn from(post: NewPost) -> Self {
        Self {
            id: NotSet,
            kind: Set(post.kind.into()),
            title: Set(post.title),
            description: Set(post.description),
            building_code: Set(post.location.building_code),
            lat: Set(post.location.lat),
            lng: Set(post.location.lng),
            reporter_id: Set(post.reporter_id),
            created_at: Set(post.created_at.into()),
            expires_at: Set(post.expires_at.into()),
            is_expired: Set(false),
            is_flagged: Set(false),
            flag_count: Set(0),
        }
    }
}

/// Full-row overwrite for updates.
impl From<Post> for ActiveModel {
    fn from(post: Post) -> Self {
        Self {
            id: Set(post.id),
            kind: Set(post.kind.into()),
            title: Set(post.title),
            description: Set(post.description),
            building_code: Set(post.location.building_code),
            lat: Set(post.location.lat),
            lng: Set(post.location.lng),
            reporter_id: Set(post.reporter_id),
            created_at: Set(post.created_at.into()),
            expires_at: Set(post.expires_at.into()),
            is_expired: Set(post.is_expired),
            is_flagged: Set(post.is_flagged),
            flag_count: Set(post.flag_count),
        }
    }
}
