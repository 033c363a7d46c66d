use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinate;
use crate::services::cache::{CacheKey, CacheManager};

/// Errors that can occur when resolving an address
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoding provider returned status {0}")]
    ProviderStatus(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Address to coordinate resolution
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a free-form address; `Ok(None)` when the provider knows no such place
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Client for a Google-compatible geocoding HTTP API
pub struct GoogleGeocoder {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl GoogleGeocoder {
    pub fn new(endpoint: String, api_key: String, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            endpoint,
            api_key,
            client,
        })
    }

    fn parse_response(json: &Value) -> Result<Option<Coordinate>, GeocodeError> {
        let status = json
            .get("status")
            .and_then(|s| s.as_str())
            .ok_or_else(|| GeocodeError::InvalidResponse("Missing status".into()))?;

        match status {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(None),
            other => return Err(GeocodeError::ProviderStatus(other.to_string())),
        }

        let location = json
            .get("results")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .and_then(|r| r.pointer("/geometry/location"))
            .ok_or_else(|| GeocodeError::InvalidResponse("Missing geometry.location".into()))?;

        let lat = location
            .get("lat")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| GeocodeError::InvalidResponse("Missing lat".into()))?;
        let lng = location
            .get("lng")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| GeocodeError::InvalidResponse("Missing lng".into()))?;

        Coordinate::try_new(lat, lng)
            .map(Some)
            .map_err(|e| GeocodeError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!(
            "{}?address={}&key={}",
            self.endpoint.trim_end_matches('/'),
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        tracing::debug!("Geocoding address: {}", address);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodeError::ProviderStatus(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;
        Self::parse_response(&json)
    }
}

/// Geocoder decorator that remembers resolved addresses
///
/// Only found coordinates are cached. A cache failure never fails the lookup.
pub struct CachedGeocoder<G> {
    inner: G,
    cache: Arc<CacheManager>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    pub fn new(inner: G, cache: Arc<CacheManager>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let key = CacheKey::geocode(address);

        if let Ok(coordinate) = self.cache.get::<Coordinate>(&key).await {
            return Ok(Some(coordinate));
        }

        let resolved = self.inner.geocode(address).await?;

        if let Some(coordinate) = &resolved {
            if let Err(e) = self.cache.set(&key, coordinate).await {
                tracing::warn!("Failed to cache geocode result for {}: {}", key, e);
            }
        }

        Ok(resolved)
    }
}
