use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use crate::core::ordering::{parse_ordering, SortKey};
use crate::error::SearchError;
use crate::models::domain::{
    AgentContact, AlertFrequency, Coordinate, GeoQuery, NewAlert, NewListing, PropertyType,
    SearchCriteria,
};

fn default_page() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn empty_list() -> serde_json::Value {
    serde_json::Value::Array(Vec::new())
}

/// Prices are stored as NUMERIC(12, 2)
fn price_ceiling() -> Decimal {
    Decimal::from(10_000_000_000_i64)
}

/// Parse an optional query value, treating a blank value as absent
///
/// HTML forms submit untouched fields as `?type_bien=&prix_min=`.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(de::Error::custom),
    }
}

fn check_price(field: &str, value: Decimal) -> Result<(), SearchError> {
    if value >= price_ceiling() {
        return Err(SearchError::validation(field, "must be less than 10000000000"));
    }
    Ok(())
}

/// Both halves of a coordinate, or neither
fn check_coordinate_pair(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<Option<Coordinate>, SearchError> {
    match (latitude, longitude) {
        (Some(lat), Some(lng)) => Coordinate::try_new(lat, lng).map(Some),
        (None, None) => Ok(None),
        (Some(_), None) => Err(SearchError::validation("longitude", "required along with latitude")),
        (None, Some(_)) => Err(SearchError::validation("latitude", "required along with longitude")),
    }
}

/// Query string of the proximity search
///
/// `GET /api/v1/annonces/proximite?lat=48.85&lng=2.35&rayon=10`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProximityQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    #[serde(rename = "lat", alias = "latitude")]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    #[serde(rename = "lng", alias = "longitude")]
    pub longitude: f64,
    #[validate(range(min = 0.0))]
    #[serde(rename = "rayon", alias = "radius_km")]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    pub page_size: Option<u32>,
}

impl ProximityQuery {
    /// Build the geo query, falling back to `default_radius_km` when no radius is given
    pub fn geo_query(&self, default_radius_km: f64) -> Result<GeoQuery, SearchError> {
        let center = Coordinate::try_new(self.latitude, self.longitude)?;
        let radius_km = self.radius_km.unwrap_or(default_radius_km);
        if radius_km.is_infinite() {
            return Err(SearchError::validation("radius_km", "must be a finite number"));
        }
        GeoQuery::new(center, radius_km)
    }
}

/// Query string of the listing search
///
/// Blank values are treated as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ListingsQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub prix_min: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub prix_max: Option<Decimal>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub type_bien: Option<PropertyType>,
    pub ville: Option<String>,
    #[validate(range(min = 0.0))]
    #[serde(default, deserialize_with = "empty_as_none")]
    pub surface_min: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub nb_chambres: Option<u32>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub nb_salles_bain: Option<u32>,
    /// Keyword in title or description
    #[serde(alias = "mots_cles")]
    pub q: Option<String>,
    /// Free text over title, description, city and address
    pub search: Option<String>,
    /// Comma-separated keys among `prix`, `surface`, `date_creation`, `-` for descending
    pub ordering: Option<String>,
    #[validate(range(min = 1))]
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub page_size: Option<u32>,
}

impl ListingsQuery {
    /// Turn present, non-blank parameters into search criteria
    pub fn criteria(&self) -> SearchCriteria {
        SearchCriteria {
            price_min: self.prix_min,
            price_max: self.prix_max,
            property_type: self.type_bien,
            city: non_blank(&self.ville),
            surface_min: self.surface_min,
            bedrooms_min: self.nb_chambres.filter(|n| *n > 0),
            bathrooms_min: self.nb_salles_bain.filter(|n| *n > 0),
            keyword: non_blank(&self.q),
            text: non_blank(&self.search),
        }
    }

    pub fn ordering(&self) -> Vec<SortKey> {
        self.ordering.as_deref().map(parse_ordering).unwrap_or_default()
    }
}

/// Request to create a listing along with its location
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateListingRequest {
    #[validate(length(min = 1, max = 200))]
    pub titre: String,
    pub description: String,
    pub prix: Decimal,
    pub type_bien: PropertyType,
    #[validate(range(min = 0.0))]
    pub surface: f64,
    #[validate(range(max = 1000))]
    pub nb_chambres: Option<u32>,
    #[validate(range(max = 1000))]
    pub nb_salles_bain: Option<u32>,
    #[validate(length(min = 1, max = 100))]
    pub nom_agent: String,
    #[validate(length(min = 1, max = 20))]
    pub telephone_agent: String,
    #[validate(email)]
    pub email_agent: String,
    #[serde(default = "empty_list")]
    pub caracteristiques: serde_json::Value,
    #[serde(default = "empty_list")]
    pub images: serde_json::Value,
    #[validate(length(min = 1, max = 255))]
    pub adresse: String,
    #[validate(length(min = 1, max = 100))]
    pub ville: String,
    #[validate(length(max = 10))]
    pub code_postal: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl CreateListingRequest {
    /// Check rules the derive cannot express
    pub fn check(&self) -> Result<(), SearchError> {
        if self.prix <= Decimal::ZERO {
            return Err(SearchError::validation("prix", "must be greater than zero"));
        }
        check_price("prix", self.prix)?;
        check_coordinate_pair(self.latitude, self.longitude)?;
        Ok(())
    }

    /// Coordinate supplied by the client, if both halves are present
    pub fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.latitude, self.longitude)
    }

    /// Single-line address handed to the geocoder
    pub fn full_address(&self) -> String {
        match self.code_postal.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            Some(postal_code) => format!("{}, {} {}", self.adresse, postal_code, self.ville),
            None => format!("{}, {}", self.adresse, self.ville),
        }
    }

    pub fn into_new_listing(self, coordinate: Option<Coordinate>) -> NewListing {
        NewListing {
            title: self.titre,
            description: self.description,
            price: self.prix,
            property_type: self.type_bien,
            surface: self.surface,
            bedrooms: self.nb_chambres,
            bathrooms: self.nb_salles_bain,
            address: self.adresse,
            city: self.ville,
            postal_code: self.code_postal,
            coordinate,
            agent: AgentContact {
                name: self.nom_agent,
                phone: self.telephone_agent,
                email: self.email_agent,
            },
            characteristics: self.caracteristiques,
            images: self.images,
        }
    }
}

/// Request to save a search alert
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAlertRequest {
    #[validate(length(min = 1, max = 100))]
    pub nom: String,
    pub prix_min: Option<Decimal>,
    pub prix_max: Option<Decimal>,
    pub type_bien: Option<PropertyType>,
    #[validate(length(max = 100))]
    pub ville: Option<String>,
    #[validate(range(min = 0.0))]
    pub surface_min: Option<f64>,
    #[validate(range(max = 1000))]
    pub nb_chambres_min: Option<u32>,
    #[validate(range(max = 1000))]
    pub nb_salles_bain_min: Option<u32>,
    #[validate(length(max = 255))]
    pub mots_cles: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(range(min = 0.0))]
    pub rayon_km: Option<f64>,
    #[serde(default)]
    pub frequence: AlertFrequency,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl CreateAlertRequest {
    pub fn check(&self) -> Result<(), SearchError> {
        for (field, value) in [("prix_min", self.prix_min), ("prix_max", self.prix_max)] {
            let Some(value) = value else { continue };
            if value < Decimal::ZERO {
                return Err(SearchError::validation(field, "must not be negative"));
            }
            check_price(field, value)?;
        }
        if let (Some(min), Some(max)) = (self.prix_min, self.prix_max) {
            if min > max {
                return Err(SearchError::validation("prix_max", "must be greater than or equal to prix_min"));
            }
        }
        if let Some(radius) = self.rayon_km {
            if !radius.is_finite() {
                return Err(SearchError::validation("rayon_km", "must be a finite number"));
            }
        }
        check_coordinate_pair(self.latitude, self.longitude)?;
        Ok(())
    }

    pub fn into_new_alert(self) -> NewAlert {
        NewAlert {
            name: self.nom,
            price_min: self.prix_min,
            price_max: self.prix_max,
            property_type: self.type_bien,
            city: self.ville,
            surface_min: self.surface_min,
            bedrooms_min: self.nb_chambres_min,
            bathrooms_min: self.nb_salles_bain_min,
            keywords: self.mots_cles,
            latitude: self.latitude,
            longitude: self.longitude,
            radius_km: self.rayon_km,
            frequency: self.frequence,
            is_active: self.active,
        }
    }
}

/// Request to geocode a free-text address
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GeocodeRequest {
    #[validate(length(min = 1, max = 255))]
    #[serde(rename = "adresse", alias = "address")]
    pub address: String,
}

impl GeocodeRequest {
    pub fn check(&self) -> Result<(), SearchError> {
        if self.address.trim().is_empty() {
            return Err(SearchError::validation("adresse", "address is required"));
        }
        Ok(())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listings_query_drops_blank_and_zero() {
        let query = ListingsQuery {
            ville: Some("".to_string()),
            nb_chambres: Some(0),
            q: Some(" garage ".to_string()),
            page: 1,
            ..Default::default()
        };
        let criteria = query.criteria();

        assert_eq!(criteria.city, None);
        assert_eq!(criteria.bedrooms_min, None);
        assert_eq!(criteria.keyword.as_deref(), Some("garage"));
    }

    #[test]
    fn test_listings_query_blank_values_are_absent() {
        let query = actix_web::web::Query::<ListingsQuery>::from_query(
            "ville=paris&type_bien=&prix_min=&prix_max=&nb_chambres=&surface_min=&page_size=",
        )
        .unwrap()
        .into_inner();

        assert_eq!(query.prix_min, None);
        assert_eq!(query.type_bien, None);
        assert_eq!(query.nb_chambres, None);
        assert_eq!(query.surface_min, None);
        assert_eq!(query.page_size, None);
        assert_eq!(query.criteria().city.as_deref(), Some("paris"));
    }

    #[test]
    fn test_listings_query_parses_present_values() {
        let query = actix_web::web::Query::<ListingsQuery>::from_query(
            "type_bien=maison&prix_min=250000.50&nb_chambres=3&search=Lyon&ordering=-prix",
        )
        .unwrap()
        .into_inner();
        let criteria = query.criteria();

        assert_eq!(criteria.property_type, Some(PropertyType::House));
        assert_eq!(criteria.price_min, Some(Decimal::new(25_000_050, 2)));
        assert_eq!(criteria.bedrooms_min, Some(3));
        assert_eq!(criteria.text.as_deref(), Some("Lyon"));
        assert_eq!(criteria.keyword, None);
        assert_eq!(query.ordering().len(), 1);

        assert!(actix_web::web::Query::<ListingsQuery>::from_query("type_bien=chateau").is_err());
        assert!(actix_web::web::Query::<ListingsQuery>::from_query("nb_chambres=abc").is_err());
    }

    #[test]
    fn test_proximity_query_default_radius() {
        let query: ProximityQuery =
            serde_json::from_value(serde_json::json!({"lat": 48.8566, "lng": 2.3522})).unwrap();
        let geo = query.geo_query(10.0).unwrap();

        assert_eq!(geo.radius_km, 10.0);
        assert_eq!(query.page, 1);
    }

    #[test]
    fn test_proximity_query_rejects_negative_radius() {
        let query: ProximityQuery = serde_json::from_value(
            serde_json::json!({"latitude": 48.8566, "longitude": 2.3522, "radius_km": -2.0}),
        )
        .unwrap();

        assert!(query.validate().is_err());
        assert!(matches!(
            query.geo_query(10.0),
            Err(SearchError::Validation { ref field, .. }) if field == "radius_km"
        ));
    }

    #[test]
    fn test_proximity_query_rejects_unbounded_radius() {
        let query = ProximityQuery {
            latitude: 48.8566,
            longitude: 2.3522,
            radius_km: Some(f64::INFINITY),
            page: 1,
            page_size: None,
        };

        assert!(query.geo_query(10.0).is_err());
    }

    #[test]
    fn test_create_listing_rejects_zero_price() {
        let request: CreateListingRequest = serde_json::from_value(serde_json::json!({
            "titre": "Studio",
            "description": "Petit studio",
            "prix": "0",
            "type_bien": "appartement",
            "surface": 18.0,
            "nom_agent": "Agent",
            "telephone_agent": "0102030405",
            "email_agent": "agent@example.com",
            "adresse": "3 rue Oberkampf",
            "ville": "Paris"
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert!(request.check().is_err());
        assert_eq!(request.full_address(), "3 rue Oberkampf, Paris");
    }

    #[test]
    fn test_alert_request_defaults() {
        let request: CreateAlertRequest =
            serde_json::from_value(serde_json::json!({"nom": "Paris 2 pieces"})).unwrap();

        assert!(request.active);
        assert_eq!(request.frequence, AlertFrequency::Weekly);
        assert!(request.check().is_ok());
    }

    #[test]
    fn test_alert_request_rejects_half_coordinate() {
        let request: CreateAlertRequest = serde_json::from_value(serde_json::json!({
            "nom": "Autour de Lyon",
            "latitude": 45.76,
            "rayon_km": 5.0
        }))
        .unwrap();

        assert!(matches!(
            request.check(),
            Err(SearchError::Validation { ref field, .. }) if field == "longitude"
        ));
    }

    #[test]
    fn test_alert_request_rejects_out_of_range_values() {
        let request: CreateAlertRequest = serde_json::from_value(serde_json::json!({
            "nom": "Budget",
            "prix_max": "10000000000"
        }))
        .unwrap();
        assert!(request.check().is_err());

        let request: CreateAlertRequest = serde_json::from_value(serde_json::json!({
            "nom": "Grande famille",
            "nb_chambres_min": 3000000000_u32
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_alert_request_rejects_inverted_prices() {
        let request: CreateAlertRequest = serde_json::from_value(serde_json::json!({
            "nom": "Budget",
            "prix_min": 500000,
            "prix_max": 100000
        }))
        .unwrap();

        assert!(request.check().is_err());
    }
}
