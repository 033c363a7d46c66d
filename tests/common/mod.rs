// Shared fixtures and in-memory collaborators for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

use immo_search::models::{
    AgentContact, AlertFrequency, Coordinate, Favorite, Listing, Location, NewAlert, NewListing,
    PropertyType, SavedAlert,
};
use immo_search::services::{GeocodeError, Geocoder, ListingStore, StoreError};

pub const PARIS: (f64, f64) = (48.8566, 2.3522);
pub const ISSY: (f64, f64) = (48.8356, 2.2394);
pub const LYON: (f64, f64) = (45.7640, 4.8357);

/// Listing fixture; newer ids are created later
pub fn listing(id: i64, price: i64, coordinate: Option<(f64, f64)>) -> Listing {
    let created_at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::hours(id);

    Listing {
        id,
        title: format!("Annonce {}", id),
        description: "Bel appartement lumineux".to_string(),
        price: Decimal::from(price),
        property_type: PropertyType::Apartment,
        surface: 60.0,
        bedrooms: Some(2),
        bathrooms: Some(1),
        location: Location {
            id,
            address: format!("{} rue de test", id),
            city: "Paris".to_string(),
            postal_code: Some("75001".to_string()),
            coordinate: coordinate.map(|(lat, lng)| Coordinate::new(lat, lng)),
        },
        is_active: true,
        agent: AgentContact {
            name: "Agent".to_string(),
            phone: "0102030405".to_string(),
            email: "agent@immo.test".to_string(),
        },
        characteristics: serde_json::json!([]),
        images: serde_json::json!([]),
        created_at,
        updated_at: created_at,
    }
}

pub fn alert(id: i64, owner_id: i64) -> SavedAlert {
    SavedAlert {
        id,
        owner_id,
        name: format!("Alerte {}", id),
        price_min: None,
        price_max: None,
        property_type: None,
        city: None,
        surface_min: None,
        bedrooms_min: None,
        bathrooms_min: None,
        keywords: None,
        latitude: None,
        longitude: None,
        radius_km: None,
        frequency: AlertFrequency::Weekly,
        is_active: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        last_notified_at: None,
    }
}

pub fn ids<'a>(listings: impl IntoIterator<Item = &'a Listing>) -> Vec<i64> {
    listings.into_iter().map(|l| l.id).collect()
}

#[derive(Default)]
struct State {
    listings: Vec<Listing>,
    alerts: Vec<SavedAlert>,
    favorites: Vec<Favorite>,
    next_id: i64,
}

/// Listing store kept in memory, newest listing first like the database
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new(listings: Vec<Listing>, alerts: Vec<SavedAlert>) -> Self {
        Self {
            state: Mutex::new(State {
                listings,
                alerts,
                favorites: Vec::new(),
                next_id: 1000,
            }),
        }
    }

    pub fn alert_snapshot(&self, id: i64) -> Option<SavedAlert> {
        let state = self.state.lock().unwrap();
        state.alerts.iter().find(|a| a.id == id).cloned()
    }

    pub fn listing_snapshot(&self, id: i64) -> Option<Listing> {
        let state = self.state.lock().unwrap();
        state.listings.iter().find(|l| l.id == id).cloned()
    }
}

fn apply_listing(listing: &mut Listing, new: NewListing) {
    listing.title = new.title;
    listing.description = new.description;
    listing.price = new.price;
    listing.property_type = new.property_type;
    listing.surface = new.surface;
    listing.bedrooms = new.bedrooms;
    listing.bathrooms = new.bathrooms;
    listing.location.address = new.address;
    listing.location.city = new.city;
    listing.location.postal_code = new.postal_code;
    listing.location.coordinate = new.coordinate;
    listing.agent = new.agent;
    listing.characteristics = new.characteristics;
    listing.images = new.images;
    listing.updated_at = Utc::now();
}

fn apply_alert(alert: &mut SavedAlert, new: NewAlert) {
    alert.name = new.name;
    alert.price_min = new.price_min;
    alert.price_max = new.price_max;
    alert.property_type = new.property_type;
    alert.city = new.city;
    alert.surface_min = new.surface_min;
    alert.bedrooms_min = new.bedrooms_min;
    alert.bathrooms_min = new.bathrooms_min;
    alert.keywords = new.keywords;
    alert.latitude = new.latitude;
    alert.longitude = new.longitude;
    alert.radius_km = new.radius_km;
    alert.frequency = new.frequency;
    alert.is_active = new.is_active;
}

#[async_trait]
impl ListingStore for InMemoryStore {
    async fn active_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let state = self.state.lock().unwrap();
        let mut active: Vec<Listing> = state.listings.iter().filter(|l| l.is_active).cloned().collect();
        active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(active)
    }

    async fn listing(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.listings.iter().find(|l| l.id == id && l.is_active).cloned())
    }

    async fn create_listing(&self, new: NewListing) -> Result<Listing, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        let now = Utc::now();

        let listing = Listing {
            id,
            title: new.title,
            description: new.description,
            price: new.price,
            property_type: new.property_type,
            surface: new.surface,
            bedrooms: new.bedrooms,
            bathrooms: new.bathrooms,
            location: Location {
                id,
                address: new.address,
                city: new.city,
                postal_code: new.postal_code,
                coordinate: new.coordinate,
            },
            is_active: true,
            agent: new.agent,
            characteristics: new.characteristics,
            images: new.images,
            created_at: now,
            updated_at: now,
        };

        state.listings.push(listing.clone());
        Ok(listing)
    }

    async fn update_listing(&self, id: i64, new: NewListing) -> Result<Option<Listing>, StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .listings
            .iter_mut()
            .find(|l| l.id == id && l.is_active)
            .map(|listing| {
                apply_listing(listing, new);
                listing.clone()
            }))
    }

    async fn retire_listing(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        match state.listings.iter_mut().find(|l| l.id == id && l.is_active) {
            Some(listing) => {
                listing.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn alerts(&self, owner_id: i64) -> Result<Vec<SavedAlert>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.alerts.iter().filter(|a| a.owner_id == owner_id).cloned().collect())
    }

    async fn alert(&self, id: i64, owner_id: i64) -> Result<Option<SavedAlert>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .alerts
            .iter()
            .find(|a| a.id == id && a.owner_id == owner_id)
            .cloned())
    }

    async fn create_alert(&self, owner_id: i64, new: NewAlert) -> Result<SavedAlert, StoreError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;

        let alert = SavedAlert {
            id: state.next_id,
            owner_id,
            name: new.name,
            price_min: new.price_min,
            price_max: new.price_max,
            property_type: new.property_type,
            city: new.city,
            surface_min: new.surface_min,
            bedrooms_min: new.bedrooms_min,
            bathrooms_min: new.bathrooms_min,
            keywords: new.keywords,
            latitude: new.latitude,
            longitude: new.longitude,
            radius_km: new.radius_km,
            frequency: new.frequency,
            is_active: new.is_active,
            created_at: Utc::now(),
            last_notified_at: None,
        };

        state.alerts.push(alert.clone());
        Ok(alert)
    }

    async fn update_alert(
        &self,
        id: i64,
        owner_id: i64,
        new: NewAlert,
    ) -> Result<Option<SavedAlert>, StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.owner_id == owner_id)
            .map(|alert| {
                apply_alert(alert, new);
                alert.clone()
            }))
    }

    async fn delete_alert(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.alerts.len();
        state.alerts.retain(|a| !(a.id == id && a.owner_id == owner_id));
        Ok(state.alerts.len() < before)
    }

    async fn toggle_alert(&self, id: i64, owner_id: i64) -> Result<Option<bool>, StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.owner_id == owner_id)
            .map(|a| {
                a.is_active = !a.is_active;
                a.is_active
            }))
    }

    async fn favorites(&self, owner_id: i64) -> Result<Vec<Favorite>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state
            .favorites
            .iter()
            .rev()
            .filter(|f| f.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn toggle_favorite(&self, owner_id: i64, listing_id: i64) -> Result<Option<bool>, StoreError> {
        let mut state = self.state.lock().unwrap();

        let Some(listing) = state
            .listings
            .iter()
            .find(|l| l.id == listing_id && l.is_active)
            .cloned()
        else {
            return Ok(None);
        };

        if let Some(pos) = state
            .favorites
            .iter()
            .position(|f| f.owner_id == owner_id && f.listing.id == listing_id)
        {
            state.favorites.remove(pos);
            return Ok(Some(false));
        }

        state.next_id += 1;
        let id = state.next_id;
        state.favorites.push(Favorite {
            id,
            owner_id,
            listing,
            added_at: Utc::now(),
        });
        Ok(Some(true))
    }

    async fn delete_favorite(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.favorites.len();
        state.favorites.retain(|f| !(f.id == id && f.owner_id == owner_id));
        Ok(state.favorites.len() < before)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Geocoder answering from a fixed address book
#[derive(Default)]
pub struct StubGeocoder {
    known: HashMap<String, Coordinate>,
    failing: bool,
}

impl StubGeocoder {
    pub fn with(mut self, address: &str, coordinate: (f64, f64)) -> Self {
        self.known
            .insert(address.to_lowercase(), Coordinate::new(coordinate.0, coordinate.1));
        self
    }

    pub fn failing() -> Self {
        Self {
            known: HashMap::new(),
            failing: true,
        }
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        if self.failing {
            return Err(GeocodeError::ProviderStatus("OVER_QUERY_LIMIT".to_string()));
        }
        Ok(self.known.get(&address.trim().to_lowercase()).copied())
    }
}
