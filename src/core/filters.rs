use crate::models::{Listing, SearchCriteria};

/// Check if a listing satisfies every present criterion
///
/// Absent criteria impose no constraint. Numeric bounds are inclusive and
/// text criteria are case-insensitive substring matches.
#[inline]
pub fn matches_criteria(listing: &Listing, criteria: &SearchCriteria) -> bool {
    if let Some(min) = criteria.price_min {
        if listing.price < min {
            return false;
        }
    }

    if let Some(max) = criteria.price_max {
        if listing.price > max {
            return false;
        }
    }

    if let Some(kind) = criteria.property_type {
        if listing.property_type != kind {
            return false;
        }
    }

    if let Some(city) = criteria.city.as_deref() {
        if !contains_ignore_case(&listing.location.city, city) {
            return false;
        }
    }

    if let Some(min) = criteria.surface_min {
        if listing.surface < min {
            return false;
        }
    }

    // Unknown room counts never satisfy a minimum
    if let Some(min) = criteria.bedrooms_min {
        if !listing.bedrooms.is_some_and(|n| n >= min) {
            return false;
        }
    }

    if let Some(min) = criteria.bathrooms_min {
        if !listing.bathrooms.is_some_and(|n| n >= min) {
            return false;
        }
    }

    if let Some(keyword) = criteria.keyword.as_deref() {
        if !contains_ignore_case(&listing.title, keyword)
            && !contains_ignore_case(&listing.description, keyword)
        {
            return false;
        }
    }

    if let Some(text) = criteria.text.as_deref() {
        if ![
            &listing.title,
            &listing.description,
            &listing.location.city,
            &listing.location.address,
        ]
        .iter()
        .any(|field| contains_ignore_case(field, text))
        {
            return false;
        }
    }

    true
}

/// Keep the listings matching `criteria`, preserving their relative order
pub fn filter_listings(candidates: Vec<Listing>, criteria: &SearchCriteria) -> Vec<Listing> {
    if criteria.is_empty() {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|listing| matches_criteria(listing, criteria))
        .collect()
}

#[inline]
fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
