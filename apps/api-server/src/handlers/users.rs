//! Account handlers.

use actix_web::{HttpResponse, web};

use mealboard_core::service::ProfileUpdate;
use mealboard_shared::ApiResponse;
use mealboard_shared::dto::{UpdateProfileRequest, UserResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/users - active accounts only, password hashes never leave
/// the service layer.
pub async fn list_users(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let users = state.user_service.list_active().await?;
    let body: Vec<UserResponse> = users.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/users/{id}
pub async fn get_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let user = state.user_service.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// PUT /api/users/profile
pub async fn update_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<UpdateProfileRequest>,
) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;

    let req = body.into_inner();
    let updated = state
        .user_service
        .update_profile(
            identity.user_id,
            ProfileUpdate {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password: req.password,
                meal_plan: req.meal_plan,
                receives_notifications: req.receives_notifications,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(updated)))
}

/// DELETE /api/users/profile - soft delete; the record and the account's
/// posts survive.
pub async fn deactivate(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    state.require_active(identity.user_id).await?;
    state.user_service.deactivate(identity.user_id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        serde_json::json!({ "userId": identity.user_id }),
        "User account deactivated",
    )))
}
