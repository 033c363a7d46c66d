// Service exports
pub mod cache;
pub mod geocoder;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use geocoder::{CachedGeocoder, GeocodeError, Geocoder, GoogleGeocoder};
pub use postgres::PostgresClient;
pub use store::{ListingStore, StoreError};
