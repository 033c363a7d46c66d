use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{ApiError, SearchError};
use crate::models::{GeocodeRequest, GeocodeResponse};
use crate::routes::AppState;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/geocoder", web::post().to(geocode_body))
        .route("/geocoder", web::get().to(geocode_query));
}

/// POST /api/v1/geocoder `{"adresse": "..."}`
async fn geocode_body(
    state: web::Data<AppState>,
    body: web::Json<GeocodeRequest>,
) -> Result<HttpResponse, ApiError> {
    geocode(&state, body.into_inner()).await
}

/// GET /api/v1/geocoder?adresse=...
async fn geocode_query(
    state: web::Data<AppState>,
    query: web::Query<GeocodeRequest>,
) -> Result<HttpResponse, ApiError> {
    geocode(&state, query.into_inner()).await
}

async fn geocode(state: &AppState, request: GeocodeRequest) -> Result<HttpResponse, ApiError> {
    request.check()?;
    request.validate()?;

    let address = request.address.trim();
    let coordinate = state
        .geocoder
        .geocode(address)
        .await?
        .ok_or_else(|| SearchError::not_found(format!("adresse '{}'", address)))?;

    Ok(HttpResponse::Ok().json(GeocodeResponse {
        adresse: address.to_string(),
        latitude: coordinate.latitude,
        longitude: coordinate.longitude,
    }))
}
