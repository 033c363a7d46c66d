use crate::models::{GeoQuery, Listing, SavedAlert, SearchCriteria};
use crate::core::{
    alerts::{evaluate_alert, AlertPreview},
    distance::{calculate_bounding_box, distance, is_within_bounding_box},
    filters::filter_listings,
    ordering::{sort_listings, SortKey},
    pager::{paginate, Page},
};

/// A listing found within a search radius, with its distance to the center
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityMatch {
    pub listing: Listing,
    pub distance_km: f64,
}

/// Keep the candidates located within `geo.radius_km` of `geo.center`
///
/// Candidates without a coordinate are dropped. Input order is preserved;
/// results are not sorted by distance.
pub fn match_within_radius(candidates: Vec<Listing>, geo: &GeoQuery) -> Vec<ProximityMatch> {
    // Stage 1: bounding box pre-filter, never excludes a point within the radius
    let bbox = calculate_bounding_box(geo.center.latitude, geo.center.longitude, geo.radius_km);

    candidates
        .into_iter()
        .filter_map(|listing| {
            let coordinate = listing.coordinate()?;
            if !is_within_bounding_box(coordinate.latitude, coordinate.longitude, &bbox) {
                return None;
            }

            // Stage 2: exact great-circle distance
            let distance_km = distance(geo.center, coordinate);
            (distance_km <= geo.radius_km).then_some(ProximityMatch { listing, distance_km })
        })
        .collect()
}

/// Paging limits applied by the matcher
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatcherLimits {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub alert_preview_limit: usize,
}

impl Default for MatcherLimits {
    fn default() -> Self {
        Self {
            default_page_size: 12,
            max_page_size: 100,
            alert_preview_limit: 20,
        }
    }
}

/// Search orchestrator - runs the filtering pipeline over a candidate universe
///
/// # Pipeline Stages
/// 1. Active listings only
/// 2. Criteria filtering
/// 3. Radius matching (when a geo query is given), or ordering
/// 4. Pagination
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    limits: MatcherLimits,
}

impl Matcher {
    pub fn new(limits: MatcherLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &MatcherLimits {
        &self.limits
    }

    /// Filter the active listings of `universe` and return one page
    pub fn search(
        &self,
        universe: Vec<Listing>,
        criteria: &SearchCriteria,
        page: u32,
        page_size: Option<u32>,
    ) -> Page<Listing> {
        self.search_ordered(universe, criteria, &[], page, page_size)
    }

    /// Like [`Matcher::search`], sorting the matches by `ordering` before paging
    pub fn search_ordered(
        &self,
        universe: Vec<Listing>,
        criteria: &SearchCriteria,
        ordering: &[SortKey],
        page: u32,
        page_size: Option<u32>,
    ) -> Page<Listing> {
        let mut matched = filter_listings(active_only(universe), criteria);
        sort_listings(&mut matched, ordering);

        tracing::debug!("Criteria search matched {} listings", matched.len());

        self.paginate(matched, page, page_size)
    }

    /// Find the active listings within a radius of a point and return one page
    pub fn search_nearby(
        &self,
        universe: Vec<Listing>,
        criteria: &SearchCriteria,
        geo: &GeoQuery,
        page: u32,
        page_size: Option<u32>,
    ) -> Page<ProximityMatch> {
        let total_candidates = universe.len();
        let filtered = filter_listings(active_only(universe), criteria);
        let matched = match_within_radius(filtered, geo);

        tracing::debug!(
            "Proximity search within {} km matched {} of {} candidates",
            geo.radius_km,
            matched.len(),
            total_candidates
        );

        self.paginate(matched, page, page_size)
    }

    /// Preview what a saved alert currently matches
    pub fn preview_alert(&self, alert: &SavedAlert, universe: Vec<Listing>) -> AlertPreview {
        evaluate_alert(alert, universe, self.limits.alert_preview_limit)
    }

    fn paginate<T>(&self, items: Vec<T>, page: u32, page_size: Option<u32>) -> Page<T> {
        paginate(
            items,
            page,
            page_size.unwrap_or(self.limits.default_page_size),
            self.limits.max_page_size,
        )
    }
}

/// Activation is a base predicate applied before any criteria
pub(crate) fn active_only(universe: Vec<Listing>) -> Vec<Listing> {
    universe.into_iter().filter(|listing| listing.is_active).collect()
}
