use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// A point on the globe, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Build a coordinate from untrusted input, rejecting non-finite or out-of-range values
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, SearchError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(SearchError::validation(
                "latitude",
                "must be a number between -90 and 90",
            ));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(SearchError::validation(
                "longitude",
                "must be a number between -180 and 180",
            ));
        }
        Ok(Self::new(latitude, longitude))
    }

    /// Pair two optional columns; a coordinate exists only when both halves do
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }
}

/// Kind of property offered by a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "appartement")]
    Apartment,
    #[serde(rename = "maison")]
    House,
    #[serde(rename = "commercial")]
    Commercial,
    #[serde(rename = "terrain")]
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Apartment => "appartement",
            PropertyType::House => "maison",
            PropertyType::Commercial => "commercial",
            PropertyType::Land => "terrain",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "appartement" => Ok(PropertyType::Apartment),
            "maison" => Ok(PropertyType::House),
            "commercial" => Ok(PropertyType::Commercial),
            "terrain" => Ok(PropertyType::Land),
            other => Err(format!("unknown property type '{}'", other)),
        }
    }
}

/// How often a saved alert should be re-evaluated by the notifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlertFrequency {
    #[serde(rename = "quotidienne")]
    Daily,
    #[default]
    #[serde(rename = "hebdomadaire")]
    Weekly,
    #[serde(rename = "mensuelle")]
    Monthly,
}

impl AlertFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertFrequency::Daily => "quotidienne",
            AlertFrequency::Weekly => "hebdomadaire",
            AlertFrequency::Monthly => "mensuelle",
        }
    }
}

impl FromStr for AlertFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "quotidienne" => Ok(AlertFrequency::Daily),
            "hebdomadaire" => Ok(AlertFrequency::Weekly),
            "mensuelle" => Ok(AlertFrequency::Monthly),
            other => Err(format!("unknown alert frequency '{}'", other)),
        }
    }
}

/// Address and optional geolocation of a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub coordinate: Option<Coordinate>,
}

/// Contact details of the agent handling a listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentContact {
    pub name: String,
    pub phone: String,
    pub email: String,
}

/// A real-estate offer with its location
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub property_type: PropertyType,
    pub surface: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub location: Location,
    pub is_active: bool,
    pub agent: AgentContact,
    pub characteristics: serde_json::Value,
    pub images: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    #[inline]
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.location.coordinate
    }
}

/// Data needed to insert a listing and its location
#[derive(Debug, Clone)]
pub struct NewListing {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub property_type: PropertyType,
    pub surface: f64,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub address: String,
    pub city: String,
    pub postal_code: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub agent: AgentContact,
    pub characteristics: serde_json::Value,
    pub images: serde_json::Value,
}

/// Saved search of a user, re-evaluated against active listings
#[derive(Debug, Clone, PartialEq)]
pub struct SavedAlert {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub surface_min: Option<f64>,
    pub bedrooms_min: Option<u32>,
    pub bathrooms_min: Option<u32>,
    pub keywords: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub frequency: AlertFrequency,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_notified_at: Option<DateTime<Utc>>,
}

/// Data needed to insert a saved alert
#[derive(Debug, Clone, Default)]
pub struct NewAlert {
    pub name: String,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub surface_min: Option<f64>,
    pub bedrooms_min: Option<u32>,
    pub bathrooms_min: Option<u32>,
    pub keywords: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_km: Option<f64>,
    pub frequency: AlertFrequency,
    pub is_active: bool,
}

/// A listing bookmarked by a user
#[derive(Debug, Clone, PartialEq)]
pub struct Favorite {
    pub id: i64,
    pub owner_id: i64,
    pub listing: Listing,
    pub added_at: DateTime<Utc>,
}

/// Non-geographic search filters. Every present field narrows the result set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchCriteria {
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub property_type: Option<PropertyType>,
    pub city: Option<String>,
    pub surface_min: Option<f64>,
    pub bedrooms_min: Option<u32>,
    pub bathrooms_min: Option<u32>,
    pub keyword: Option<String>,
    /// Free text matched against title, description, city or address
    pub text: Option<String>,
}

impl SearchCriteria {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Radius-bounded geographic constraint
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoQuery {
    pub center: Coordinate,
    pub radius_km: f64,
}

impl GeoQuery {
    /// Build a geo query, rejecting negative or NaN radii. An infinite radius is allowed.
    pub fn new(center: Coordinate, radius_km: f64) -> Result<Self, SearchError> {
        if radius_km.is_nan() || radius_km < 0.0 {
            return Err(SearchError::validation(
                "radius_km",
                "must be a non-negative number",
            ));
        }
        Ok(Self { center, radius_km })
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
