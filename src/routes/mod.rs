// Route exports
pub mod alerts;
pub mod favorites;
pub mod geocode;
pub mod listings;

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use std::sync::Arc;

use crate::core::{Matcher, Page};
use crate::error::ApiError;
use crate::models::PageResponse;
use crate::services::{Geocoder, ListingStore};

/// Header carrying the authenticated user, set by the upstream gateway
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ListingStore>,
    pub geocoder: Arc<dyn Geocoder>,
    pub matcher: Matcher,
    pub default_radius_km: f64,
}

/// Identity of the user making the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester(pub i64);

impl FromRequest for Requester {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let id = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok());

        ready(match id {
            Some(id) => Ok(Requester(id)),
            None => Err(ApiError::Unauthorized(format!(
                "missing or invalid {} header",
                USER_ID_HEADER
            ))),
        })
    }
}

/// Wrap a page in the `{count, next, previous, results}` envelope
///
/// Links are absolute and keep every query parameter of the request except `page`.
pub fn page_response<T>(req: &HttpRequest, page: Page<T>) -> PageResponse<T> {
    PageResponse {
        count: page.count,
        next: page.next_page().map(|p| page_url(req, p)),
        previous: page.previous_page().map(|p| page_url(req, p)),
        results: page.items,
    }
}

/// Absolute URL of the current request pointing at another page; page 1 drops the parameter
fn page_url(req: &HttpRequest, page: u32) -> String {
    let mut params: Vec<&str> = req
        .query_string()
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| pair.split('=').next() != Some("page"))
        .collect();

    let page_param = format!("page={}", page);
    if page > 1 {
        params.push(&page_param);
    }

    let info = req.connection_info();
    let base = format!("{}://{}{}", info.scheme(), info.host(), req.path());

    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(listings::configure)
            .configure(geocode::configure)
            .configure(favorites::configure)
            .configure(alerts::configure),
    );
}
