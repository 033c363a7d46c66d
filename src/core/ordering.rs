use std::cmp::Ordering;

use crate::models::Listing;

/// Listing attribute a result set can be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Price,
    Surface,
    CreatedAt,
}

/// One ordering key, ascending unless prefixed with `-` on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (descending, name) = match raw.strip_prefix('-') {
            Some(name) => (true, name),
            None => (false, raw),
        };

        let field = match name {
            "prix" => SortField::Price,
            "surface" => SortField::Surface,
            "date_creation" => SortField::CreatedAt,
            _ => return None,
        };

        Some(Self { field, descending })
    }

    fn compare(&self, a: &Listing, b: &Listing) -> Ordering {
        let ordering = match self.field {
            SortField::Price => a.price.cmp(&b.price),
            SortField::Surface => a.surface.total_cmp(&b.surface),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };

        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Parse a comma-separated `ordering` parameter such as `-prix,surface`
///
/// Unknown fields are ignored, so an unusable value leaves the storage order.
pub fn parse_ordering(raw: &str) -> Vec<SortKey> {
    raw.split(',').filter_map(SortKey::parse).collect()
}

/// Stable sort by `keys` in turn; ties keep their incoming order
pub fn sort_listings(listings: &mut [Listing], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }

    listings.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
