use actix_web::{web, HttpRequest, HttpResponse};
use validator::Validate;

use crate::error::{ApiError, SearchError};
use crate::models::{
    Coordinate, CreateListingRequest, HealthResponse, ListingDto, ListingsQuery, ProximityQuery,
    SearchCriteria,
};
use crate::routes::{page_response, AppState};

/// Configure listing and health routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    // `proximite` must be registered before `{id}`
    cfg.route("/health", web::get().to(health_check))
        .route("/annonces", web::get().to(list_listings))
        .route("/annonces", web::post().to(create_listing))
        .route("/annonces/proximite", web::get().to(nearby_listings))
        .route("/annonces/{id}", web::get().to(listing_detail))
        .route("/annonces/{id}", web::put().to(update_listing))
        .route("/annonces/{id}", web::delete().to(retire_listing));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = match state.store.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            false
        }
    };

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Criteria search over active listings
///
/// GET /api/v1/annonces?ville=Paris&prix_max=300000&q=terrasse&ordering=-prix&page=1
async fn list_listings(
    state: web::Data<AppState>,
    query: web::Query<ListingsQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    query.validate()?;

    let criteria = query.criteria();
    let ordering = query.ordering();
    let universe = state.store.active_listings().await?;

    tracing::info!("Listing search over {} listings, criteria: {:?}", universe.len(), criteria);

    let page = state
        .matcher
        .search_ordered(universe, &criteria, &ordering, query.page, query.page_size)
        .map(|listing| ListingDto::from(&listing));

    Ok(HttpResponse::Ok().json(page_response(&req, page)))
}

/// Ad-hoc proximity search
///
/// GET /api/v1/annonces/proximite?lat=48.8566&lng=2.3522&rayon=5
///
/// Each result carries its `distance` in kilometers. Results keep the
/// storage order (newest first), they are not sorted by distance.
async fn nearby_listings(
    state: web::Data<AppState>,
    query: web::Query<ProximityQuery>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let geo = query.geo_query(state.default_radius_km)?;
    query.validate()?;

    let universe = state.store.active_listings().await?;

    tracing::info!(
        "Proximity search around ({}, {}) within {} km",
        geo.center.latitude,
        geo.center.longitude,
        geo.radius_km
    );

    let page = state
        .matcher
        .search_nearby(universe, &SearchCriteria::default(), &geo, query.page, query.page_size)
        .map(|found| ListingDto::from(&found));

    Ok(HttpResponse::Ok().json(page_response(&req, page)))
}

/// Active listing detail
async fn listing_detail(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let listing = state
        .store
        .listing(id)
        .await?
        .ok_or_else(|| SearchError::not_found(format!("annonce {}", id)))?;

    Ok(HttpResponse::Ok().json(ListingDto::from(&listing)))
}

/// Coordinate of a listing request, geocoding the address when none is supplied
///
/// A geocoding failure is logged and leaves the coordinate absent; such a
/// listing never shows up in proximity searches.
async fn resolve_coordinate(state: &AppState, request: &CreateListingRequest) -> Option<Coordinate> {
    if let Some(coordinate) = request.coordinate() {
        return Some(coordinate);
    }

    let address = request.full_address();
    match state.geocoder.geocode(&address).await {
        Ok(Some(coordinate)) => Some(coordinate),
        Ok(None) => {
            tracing::warn!("No coordinate found for address: {}", address);
            None
        }
        Err(e) => {
            tracing::warn!("Geocoding failed for address {}: {}", address, e);
            None
        }
    }
}

/// Create a listing with its location
async fn create_listing(
    state: web::Data<AppState>,
    body: web::Json<CreateListingRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    body.check()?;

    let request = body.into_inner();
    let coordinate = resolve_coordinate(&state, &request).await;

    let listing = state
        .store
        .create_listing(request.into_new_listing(coordinate))
        .await?;

    tracing::info!("Created listing {} in {}", listing.id, listing.location.city);

    Ok(HttpResponse::Created().json(ListingDto::from(&listing)))
}

/// Replace an active listing and its location
async fn update_listing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<CreateListingRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    body.check()?;

    let id = path.into_inner();
    let request = body.into_inner();
    let coordinate = resolve_coordinate(&state, &request).await;

    let listing = state
        .store
        .update_listing(id, request.into_new_listing(coordinate))
        .await?
        .ok_or_else(|| SearchError::not_found(format!("annonce {}", id)))?;

    tracing::info!("Updated listing {}", listing.id);

    Ok(HttpResponse::Ok().json(ListingDto::from(&listing)))
}

/// Retire a listing: it stays stored but leaves every search
async fn retire_listing(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if !state.store.retire_listing(id).await? {
        return Err(SearchError::not_found(format!("annonce {}", id)).into());
    }

    tracing::info!("Retired listing {}", id);

    Ok(HttpResponse::NoContent().finish())
}
