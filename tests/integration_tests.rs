// Integration tests for Immo Search

mod common;

use common::{alert, ids, listing, InMemoryStore, ISSY, LYON, PARIS};
use immo_search::core::{evaluate_alert, match_within_radius, Matcher, MatcherLimits};
use immo_search::models::{Coordinate, GeoQuery, SearchCriteria};
use immo_search::services::ListingStore;
use rust_decimal::Decimal;

fn paris_query(radius_km: f64) -> GeoQuery {
    GeoQuery::new(Coordinate::new(PARIS.0, PARIS.1), radius_km).unwrap()
}

#[test]
fn test_radius_shrink_keeps_only_coincident_listing() {
    let universe = vec![listing(1, 300_000, Some(PARIS)), listing(2, 300_000, Some(ISSY))];

    let wide = match_within_radius(universe.clone(), &paris_query(10.0));
    assert_eq!(wide.iter().map(|m| m.listing.id).collect::<Vec<_>>(), vec![1, 2]);
    assert!(wide[0].distance_km.abs() < 1e-9);
    assert!(wide[1].distance_km > 5.0 && wide[1].distance_km < 10.0);

    let narrow = match_within_radius(universe, &paris_query(1.0));
    assert_eq!(narrow.iter().map(|m| m.listing.id).collect::<Vec<_>>(), vec![1]);
}

#[test]
fn test_listing_without_coordinate_never_matches() {
    let universe = vec![listing(1, 300_000, None), listing(2, 300_000, Some(LYON))];

    for radius in [0.0, 10.0, 20_000.0, f64::INFINITY] {
        let found = match_within_radius(universe.clone(), &paris_query(radius));
        assert!(found.iter().all(|m| m.listing.id != 1));
    }

    let unbounded = match_within_radius(universe, &paris_query(f64::INFINITY));
    assert_eq!(unbounded.len(), 1);
}

#[test]
fn test_zero_radius_matches_exact_center() {
    let universe = vec![listing(1, 300_000, Some(PARIS)), listing(2, 300_000, Some(ISSY))];
    let found = match_within_radius(universe, &paris_query(0.0));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].listing.id, 1);
}

#[test]
fn test_page_past_the_end_is_empty_with_full_count() {
    let matcher = Matcher::default();
    let universe: Vec<_> = (1..=12).map(|i| listing(i, 100_000, None)).collect();

    let page = matcher.search(universe, &SearchCriteria::default(), 5, Some(10));

    assert!(page.items.is_empty());
    assert_eq!(page.count, 12);
    assert_eq!(page.next_page(), None);
    assert_eq!(page.previous_page(), Some(2));
}

#[test]
fn test_search_nearby_combines_criteria_activation_and_radius() {
    let mut inactive = listing(3, 200_000, Some(PARIS));
    inactive.is_active = false;

    let universe = vec![
        listing(1, 200_000, Some(PARIS)),
        listing(2, 900_000, Some(ISSY)),
        inactive,
        listing(4, 200_000, Some(LYON)),
        listing(5, 250_000, None),
    ];
    let criteria = SearchCriteria {
        price_max: Some(Decimal::from(500_000)),
        ..Default::default()
    };

    let page = Matcher::default().search_nearby(universe, &criteria, &paris_query(50.0), 1, None);

    assert_eq!(page.count, 1);
    assert_eq!(page.items[0].listing.id, 1);
}

#[test]
fn test_page_size_is_capped() {
    let matcher = Matcher::new(MatcherLimits {
        default_page_size: 5,
        max_page_size: 20,
        alert_preview_limit: 3,
    });
    let universe: Vec<_> = (1..=50).map(|i| listing(i, 100_000, None)).collect();

    let default_page = matcher.search(universe.clone(), &SearchCriteria::default(), 1, None);
    assert_eq!(default_page.items.len(), 5);

    let capped = matcher.search(universe, &SearchCriteria::default(), 1, Some(1000));
    assert_eq!(capped.items.len(), 20);
    assert_eq!(capped.count, 50);
}

#[test]
fn test_alert_keyword_matches_description() {
    let mut with_garage = listing(1, 300_000, Some(PARIS));
    with_garage.title = "Appartement T3".to_string();
    with_garage.description = "Vendu avec un Garage fermé".to_string();
    let without = listing(2, 300_000, Some(PARIS));

    let mut saved = alert(10, 1);
    saved.keywords = Some("garage".to_string());

    let preview = evaluate_alert(&saved, vec![with_garage, without], 20);

    assert_eq!(preview.matched_count, 1);
    assert_eq!(ids(&preview.sample), vec![1]);
}

#[test]
fn test_alert_preview_counts_before_truncation() {
    let universe: Vec<_> = (1..=30).map(|i| listing(i, 100_000, None)).collect();
    let preview = evaluate_alert(&alert(1, 1), universe, 20);

    assert_eq!(preview.matched_count, 30);
    assert_eq!(preview.sample.len(), 20);
    assert_eq!(ids(&preview.sample), (1..=20).collect::<Vec<i64>>());
}

#[test]
fn test_alert_geo_constraint_needs_positive_radius() {
    let universe = vec![listing(1, 100_000, Some(PARIS)), listing(2, 100_000, Some(LYON))];

    let mut saved = alert(1, 1);
    saved.latitude = Some(PARIS.0);
    saved.longitude = Some(PARIS.1);
    saved.radius_km = Some(20.0);
    assert_eq!(evaluate_alert(&saved, universe.clone(), 20).matched_count, 1);

    // Zero radius and missing center both mean "anywhere"
    saved.radius_km = Some(0.0);
    assert_eq!(evaluate_alert(&saved, universe.clone(), 20).matched_count, 2);

    saved.radius_km = Some(20.0);
    saved.longitude = None;
    assert_eq!(evaluate_alert(&saved, universe, 20).matched_count, 2);
}

#[test]
fn test_alert_blank_criteria_are_ignored() {
    let mut saved = alert(1, 1);
    saved.city = Some("   ".to_string());
    saved.keywords = Some(String::new());
    saved.bedrooms_min = Some(0);

    let mut no_rooms = listing(1, 100_000, None);
    no_rooms.bedrooms = None;

    let preview = evaluate_alert(&saved, vec![no_rooms, listing(2, 100_000, None)], 20);
    assert_eq!(preview.matched_count, 2);
}

#[test]
fn test_preview_over_store_leaves_alert_untouched() {
    let mut saved = alert(7, 1);
    saved.price_max = Some(Decimal::from(150_000));

    let store = InMemoryStore::new(
        vec![listing(1, 100_000, Some(PARIS)), listing(2, 200_000, Some(PARIS))],
        vec![saved.clone()],
    );

    let universe = tokio_test::block_on(store.active_listings()).unwrap();
    let preview = Matcher::default().preview_alert(&saved, universe);

    assert_eq!(preview.matched_count, 1);
    assert_eq!(store.alert_snapshot(7), Some(saved));
}

#[tokio::test]
async fn test_store_returns_newest_first_and_scopes_alerts() {
    let store = InMemoryStore::new(
        vec![listing(1, 100_000, None), listing(3, 100_000, None), listing(2, 100_000, None)],
        vec![alert(1, 1), alert(2, 2)],
    );

    let universe = store.active_listings().await.unwrap();
    assert_eq!(ids(&universe), vec![3, 2, 1]);

    assert!(store.alert(2, 1).await.unwrap().is_none());
    assert_eq!(store.alerts(2).await.unwrap().len(), 1);
    assert_eq!(store.toggle_alert(1, 2).await.unwrap(), None);
    assert_eq!(store.toggle_alert(1, 1).await.unwrap(), Some(false));
}
