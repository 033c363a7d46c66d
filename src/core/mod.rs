// Core algorithm exports
pub mod alerts;
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod ordering;
pub mod pager;

pub use alerts::{alert_criteria, alert_geo_query, evaluate_alert, AlertPreview};
pub use distance::{calculate_bounding_box, distance, haversine_distance, is_within_bounding_box};
pub use filters::{filter_listings, matches_criteria};
pub use matcher::{match_within_radius, Matcher, MatcherLimits, ProximityMatch};
pub use ordering::{parse_ordering, sort_listings, SortField, SortKey};
pub use pager::{paginate, Page};
