// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AgentContact, AlertFrequency, BoundingBox, Coordinate, Favorite, GeoQuery, Listing, Location,
    NewAlert, NewListing, PropertyType, SavedAlert, SearchCriteria,
};
pub use requests::{CreateAlertRequest, CreateListingRequest, GeocodeRequest, ListingsQuery, ProximityQuery};
pub use responses::{
    AlertDto, AlertPreviewResponse, ErrorResponse, FavoriteDto, GeocodeResponse, HealthResponse,
    ListingDto, LocationDto, PageResponse, ToggleAlertResponse, ToggleFavoriteResponse,
};
