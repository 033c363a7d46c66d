use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Favorite, Listing, NewAlert, NewListing, SavedAlert};

/// Errors that can occur when reading or writing listings
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),
}

/// Persistence collaborator of the search engine
///
/// Every alert and favorite operation is scoped to `owner_id`; a record owned
/// by someone else behaves as if it did not exist.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// All active listings with their location, newest first
    async fn active_listings(&self) -> Result<Vec<Listing>, StoreError>;

    /// A single active listing
    async fn listing(&self, id: i64) -> Result<Option<Listing>, StoreError>;

    /// Insert a listing and its location
    async fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError>;

    /// Replace an active listing and its location; `None` when no such active listing
    async fn update_listing(&self, id: i64, listing: NewListing) -> Result<Option<Listing>, StoreError>;

    /// Clear the active flag; retired listings are kept but no longer searched.
    /// Returns false when no active listing has this id.
    async fn retire_listing(&self, id: i64) -> Result<bool, StoreError>;

    async fn alerts(&self, owner_id: i64) -> Result<Vec<SavedAlert>, StoreError>;

    async fn alert(&self, id: i64, owner_id: i64) -> Result<Option<SavedAlert>, StoreError>;

    async fn create_alert(&self, owner_id: i64, alert: NewAlert) -> Result<SavedAlert, StoreError>;

    /// Replace the criteria of an alert, keeping its creation and notification dates
    async fn update_alert(
        &self,
        id: i64,
        owner_id: i64,
        alert: NewAlert,
    ) -> Result<Option<SavedAlert>, StoreError>;

    async fn delete_alert(&self, id: i64, owner_id: i64) -> Result<bool, StoreError>;

    /// Flip the activation flag; `None` when the alert does not exist for this owner
    async fn toggle_alert(&self, id: i64, owner_id: i64) -> Result<Option<bool>, StoreError>;

    async fn favorites(&self, owner_id: i64) -> Result<Vec<Favorite>, StoreError>;

    /// Add or remove a favorite; `None` when the listing is unknown or inactive
    async fn toggle_favorite(&self, owner_id: i64, listing_id: i64) -> Result<Option<bool>, StoreError>;

    /// Remove a favorite by its own id
    async fn delete_favorite(&self, id: i64, owner_id: i64) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}
