//! Building Directory handler.

use actix_web::HttpResponse;

use mealboard_core::domain::all_buildings;
use mealboard_shared::dto::BuildingResponse;

use crate::middleware::error::AppResult;

/// GET /api/buildings - the static directory, for client building
/// pickers and map pins.
pub async fn list_buildings() -> AppResult<HttpResponse> {
    let body: Vec<BuildingResponse> = all_buildings()
        .iter()
        .map(|b| BuildingResponse {
            code: b.code.to_string(),
            name: b.name.to_string(),
            lat: b.lat,
            lng: b.lng,
        })
        .collect();

    Ok(HttpResponse::Ok().json(body))
}
