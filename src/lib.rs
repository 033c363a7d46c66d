//! Immo Search - proximity search and saved-alert matching for real-estate listings
//!
//! This library provides the search engine behind the listing API: great-circle
//! distance, criteria filtering, radius matching, pagination and saved alert
//! previews, plus the HTTP routes and storage/geocoding services around them.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    distance::{calculate_bounding_box, haversine_distance},
    evaluate_alert, filter_listings, match_within_radius, paginate, Matcher, MatcherLimits, Page,
};
pub use error::{ApiError, SearchError};
pub use models::{Coordinate, GeoQuery, Listing, SavedAlert, SearchCriteria};
