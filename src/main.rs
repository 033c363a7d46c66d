use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use immo_search::config::Settings;
use immo_search::core::Matcher;
use immo_search::error::{handle_json_payload_error, handle_path_error, handle_query_payload_error};
use immo_search::routes::{self, AppState};
use immo_search::services::{CacheManager, CachedGeocoder, GoogleGeocoder, PostgresClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(default_level: &str, default_format: &str) {
    // LOG_LEVEL and LOG_FORMAT win over the config file
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| default_level.to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| default_format.to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("Configuration error: {}", e)))?;

    init_tracing(&settings.logging.level, &settings.logging.format);

    info!("Starting Immo Search service...");

    // Initialize cache manager (Redis is optional, L1 always works)
    let cache_ttl = settings.cache.ttl_secs.unwrap_or(86_400);
    let l1_cache_size = settings.cache.l1_cache_size.unwrap_or(10_000);

    let cache = match settings.cache.redis_url.as_deref() {
        Some(redis_url) => match CacheManager::new(redis_url, l1_cache_size, cache_ttl).await {
            Ok(c) => {
                info!("Cache manager initialized (L1: {} entries, TTL: {}s, Redis enabled)", l1_cache_size, cache_ttl);
                c
            }
            Err(e) => {
                warn!("Failed to connect to Redis ({}), running with in-process cache only", e);
                CacheManager::in_memory(l1_cache_size, cache_ttl)
            }
        },
        None => {
            info!("No Redis configured, running with in-process cache only");
            CacheManager::in_memory(l1_cache_size, cache_ttl)
        }
    };

    // Initialize geocoder
    if settings.geocoding.api_key.is_empty() {
        warn!("No geocoding API key configured, address lookups will be rejected by the provider");
    }

    let google = GoogleGeocoder::new(
        settings.geocoding.endpoint.clone(),
        settings.geocoding.api_key.clone(),
        Duration::from_secs(settings.geocoding.timeout_secs.unwrap_or(10)),
    )
    .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, format!("Geocoder error: {}", e)))?;

    let geocoder = Arc::new(CachedGeocoder::new(google, Arc::new(cache)));

    // Initialize PostgreSQL client
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let postgres = PostgresClient::from_settings(
        &settings.database.url,
        Some(db_max_conn),
        settings.database.min_connections,
        settings.database.acquire_timeout_secs,
        settings.database.idle_timeout_secs,
    )
    .await
    .map_err(|e| {
        error!("Failed to connect to PostgreSQL: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, format!("PostgreSQL connection error: {}", e))
    })?;

    info!("PostgreSQL client initialized (max: {} connections)", db_max_conn);

    let matcher = Matcher::new(settings.search.limits());

    info!("Matcher initialized with limits: {:?}", matcher.limits());

    // Build application state
    let app_state = AppState {
        store: Arc::new(postgres),
        geocoder,
        matcher,
        default_radius_km: settings.search.default_radius_km,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .app_data(web::PathConfig::default().error_handler(handle_path_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
