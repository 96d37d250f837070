//! Post handlers - the board itself.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use mealboard_core::ports::PostFilter;
use mealboard_core::validate::{PostInput, PostUpdate};
use mealboard_shared::ApiResponse;
use mealboard_shared::dto::{
    CreatePostRequest, FlagResponse, ListPostsQuery, PostResponse, UpdatePostRequest,
};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts - authenticated.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let req = body.into_inner();
    let view = state
        .post_service
        .create(
            identity.user_id,
            PostInput {
                kind: req.kind,
                title: req.title,
                description: req.description,
                building_code: req.location.building_code,
                expires_at: req.expires_at,
            },
        )
        .await?;

    Ok(HttpResponse::Created().json(PostResponse::from_view(view, Utc::now())))
}

/// GET /api/posts - public; optional `type`, `location` (building code)
/// and `isExpired` query constraints.
pub async fn list_posts(
    state: web::Data<AppState>,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        kind: query.kind,
        building_code: query.location,
        expired: query.is_expired,
    };

    let now = Utc::now();
    let views = state.post_service.list(&filter).await?;
    let body: Vec<PostResponse> = views
        .into_iter()
        .map(|v| PostResponse::from_view(v, now))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/posts/{id} - public.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let view = state.post_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from_view(view, Utc::now())))
}

/// PUT /api/posts/{id} - owner only; merges only the fields present in
/// the request body.
pub async fn update_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let req = body.into_inner();
    let view = state
        .post_service
        .update(
            identity.user_id,
            path.into_inner(),
            PostUpdate {
                title: req.title,
                description: req.description,
                building_code: req.location.map(|l| l.building_code),
                expires_at: req.expires_at,
                is_expired: req.is_expired,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse::from_view(view, Utc::now())))
}

/// DELETE /api/posts/{id} - owner only, hard delete.
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let post_id = path.into_inner();
    state.post_service.delete(identity.user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        serde_json::json!({ "postId": post_id }),
        "Post deleted",
    )))
}

/// PUT /api/posts/{id}/flag - public; any caller may flag, the reporter
/// included.
pub async fn flag_post(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let flag_count = state.post_service.flag(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(FlagResponse { flag_count }))
}

/// PUT /api/posts/{id}/expire - owner only, idempotent.
pub async fn expire_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let post_id = path.into_inner();
    state.post_service.expire(identity.user_id, post_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        serde_json::json!({ "postId": post_id, "isExpired": true }),
        "Post expired",
    )))
}

/// GET /api/posts/user/{userId} - authenticated.
pub async fn list_by_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let now = Utc::now();
    let views = state.post_service.list_by_reporter(path.into_inner()).await?;
    let body: Vec<PostResponse> = views
        .into_iter()
        .map(|v| PostResponse::from_view(v, now))
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
