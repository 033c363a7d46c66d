use crate::core::{filters::filter_listings, matcher::{active_only, match_within_radius}};
use crate::models::{Coordinate, GeoQuery, Listing, SavedAlert, SearchCriteria};

/// What a saved alert matches right now
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPreview {
    /// Number of active listings matching the alert, before truncation
    pub matched_count: usize,
    /// The first matches, in upstream order
    pub sample: Vec<Listing>,
}

/// Search criteria stored on an alert
///
/// Blank text and zero room minimums are stored by clients to mean "any" and
/// are dropped here.
pub fn alert_criteria(alert: &SavedAlert) -> SearchCriteria {
    SearchCriteria {
        price_min: alert.price_min,
        price_max: alert.price_max,
        property_type: alert.property_type,
        city: non_blank(alert.city.as_deref()),
        surface_min: alert.surface_min,
        bedrooms_min: alert.bedrooms_min.filter(|n| *n > 0),
        bathrooms_min: alert.bathrooms_min.filter(|n| *n > 0),
        keyword: non_blank(alert.keywords.as_deref()),
        text: None,
    }
}

/// Geographic constraint of an alert; requires a center and a positive radius
pub fn alert_geo_query(alert: &SavedAlert) -> Option<GeoQuery> {
    let center = Coordinate::from_parts(alert.latitude, alert.longitude)?;
    let radius_km = alert.radius_km.filter(|r| *r > 0.0)?;
    GeoQuery::new(center, radius_km).ok()
}

/// Evaluate an alert against a listing universe without touching the alert
pub fn evaluate_alert(alert: &SavedAlert, universe: Vec<Listing>, preview_limit: usize) -> AlertPreview {
    let criteria = alert_criteria(alert);
    let filtered = filter_listings(active_only(universe), &criteria);

    let matched: Vec<Listing> = match alert_geo_query(alert) {
        Some(geo) => match_within_radius(filtered, &geo)
            .into_iter()
            .map(|m| m.listing)
            .collect(),
        None => filtered,
    };

    let matched_count = matched.len();
    let mut sample = matched;
    sample.truncate(preview_limit);

    tracing::debug!(
        "Alert {} matched {} listings ({} in preview)",
        alert.id,
        matched_count,
        sample.len()
    );

    AlertPreview { matched_count, sample }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
