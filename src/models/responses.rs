use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{AlertPreview, ProximityMatch};
use crate::models::domain::{AlertFrequency, Favorite, Listing, Location, PropertyType, SavedAlert};

/// Location as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDto {
    pub id: i64,
    pub adresse: String,
    pub ville: String,
    pub code_postal: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&Location> for LocationDto {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            adresse: location.address.clone(),
            ville: location.city.clone(),
            code_postal: location.postal_code.clone(),
            latitude: location.coordinate.map(|c| c.latitude),
            longitude: location.coordinate.map(|c| c.longitude),
        }
    }
}

/// Listing as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingDto {
    pub id: i64,
    pub titre: String,
    pub description: String,
    pub prix: Decimal,
    pub type_bien: PropertyType,
    pub surface: f64,
    pub nb_chambres: Option<u32>,
    pub nb_salles_bain: Option<u32>,
    pub lieu: LocationDto,
    pub date_creation: DateTime<Utc>,
    pub nom_agent: String,
    pub telephone_agent: String,
    pub email_agent: String,
    pub caracteristiques: serde_json::Value,
    pub images: serde_json::Value,
    /// Kilometers from the search center, only set by proximity search
    pub distance: Option<f64>,
}

impl From<&Listing> for ListingDto {
    fn from(listing: &Listing) -> Self {
        Self {
            id: listing.id,
            titre: listing.title.clone(),
            description: listing.description.clone(),
            prix: listing.price,
            type_bien: listing.property_type,
            surface: listing.surface,
            nb_chambres: listing.bedrooms,
            nb_salles_bain: listing.bathrooms,
            lieu: LocationDto::from(&listing.location),
            date_creation: listing.created_at,
            nom_agent: listing.agent.name.clone(),
            telephone_agent: listing.agent.phone.clone(),
            email_agent: listing.agent.email.clone(),
            caracteristiques: listing.characteristics.clone(),
            images: listing.images.clone(),
            distance: None,
        }
    }
}

impl From<&ProximityMatch> for ListingDto {
    fn from(found: &ProximityMatch) -> Self {
        Self {
            distance: Some(found.distance_km),
            ..Self::from(&found.listing)
        }
    }
}

/// Paginated envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub count: usize,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// Saved alert as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertDto {
    pub id: i64,
    pub nom: String,
    pub prix_min: Option<Decimal>,
    pub prix_max: Option<Decimal>,
    pub type_bien: Option<PropertyType>,
    pub ville: Option<String>,
    pub surface_min: Option<f64>,
    pub nb_chambres_min: Option<u32>,
    pub nb_salles_bain_min: Option<u32>,
    pub mots_cles: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub rayon_km: Option<f64>,
    pub frequence: AlertFrequency,
    pub active: bool,
    pub date_creation: DateTime<Utc>,
    pub derniere_notification: Option<DateTime<Utc>>,
}

impl From<&SavedAlert> for AlertDto {
    fn from(alert: &SavedAlert) -> Self {
        Self {
            id: alert.id,
            nom: alert.name.clone(),
            prix_min: alert.price_min,
            prix_max: alert.price_max,
            type_bien: alert.property_type,
            ville: alert.city.clone(),
            surface_min: alert.surface_min,
            nb_chambres_min: alert.bedrooms_min,
            nb_salles_bain_min: alert.bathrooms_min,
            mots_cles: alert.keywords.clone(),
            latitude: alert.latitude,
            longitude: alert.longitude,
            rayon_km: alert.radius_km,
            frequence: alert.frequency,
            active: alert.is_active,
            date_creation: alert.created_at,
            derniere_notification: alert.last_notified_at,
        }
    }
}

/// Response of the alert preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPreviewResponse {
    pub alerte: AlertDto,
    pub nombre_resultats: usize,
    pub annonces_exemple: Vec<ListingDto>,
}

impl AlertPreviewResponse {
    pub fn new(alert: &SavedAlert, preview: &AlertPreview) -> Self {
        Self {
            alerte: AlertDto::from(alert),
            nombre_resultats: preview.matched_count,
            annonces_exemple: preview.sample.iter().map(ListingDto::from).collect(),
        }
    }
}

/// Favorite as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoriteDto {
    pub id: i64,
    pub annonce: ListingDto,
    pub date_ajout: DateTime<Utc>,
}

impl From<&Favorite> for FavoriteDto {
    fn from(favorite: &Favorite) -> Self {
        Self {
            id: favorite.id,
            annonce: ListingDto::from(&favorite.listing),
            date_ajout: favorite.added_at,
        }
    }
}

/// Favorite toggle response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleFavoriteResponse {
    pub message: String,
    pub is_favorite: bool,
}

/// Alert toggle response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleAlertResponse {
    pub message: String,
    pub active: bool,
}

/// Geocoding response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub adresse: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub status_code: u16,
}
