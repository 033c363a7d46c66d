use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{
    AgentContact, AlertFrequency, Coordinate, Favorite, Listing, Location, NewAlert, NewListing,
    PropertyType, SavedAlert,
};
use crate::services::store::{ListingStore, StoreError};

const LISTING_COLUMNS: &str = r#"
    a.id, a.titre, a.description, a.prix, a.type_bien, a.surface,
    a.nb_chambres, a.nb_salles_bain, a.actif,
    a.nom_agent, a.telephone_agent, a.email_agent,
    a.caracteristiques, a.images, a.date_creation, a.date_modification,
    l.id AS lieu_id, l.adresse, l.ville, l.code_postal, l.latitude, l.longitude
"#;

const ALERT_COLUMNS: &str = r#"
    id, utilisateur_id, nom, prix_min, prix_max, type_bien, ville, surface_min,
    nb_chambres_min, nb_salles_bain_min, mots_cles, latitude, longitude, rayon_km,
    frequence, active, date_creation, derniere_notification
"#;

/// PostgreSQL-backed listing store
///
/// Listings, locations, favorites and saved alerts live in the same database.
/// Migrations are embedded and run on startup.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl ListingStore for PostgresClient {
    async fn active_listings(&self) -> Result<Vec<Listing>, StoreError> {
        let query = format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM annonces a
            JOIN lieux l ON l.id = a.lieu_id
            WHERE a.actif
            ORDER BY a.date_creation DESC, a.id DESC
            "#
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let listings = rows.iter().map(listing_from_row).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} active listings", listings.len());

        Ok(listings)
    }

    async fn listing(&self, id: i64) -> Result<Option<Listing>, StoreError> {
        let query = format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM annonces a
            JOIN lieux l ON l.id = a.lieu_id
            WHERE a.id = $1 AND a.actif
            "#
        );

        sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(listing_from_row)
            .transpose()
    }

    async fn create_listing(&self, listing: NewListing) -> Result<Listing, StoreError> {
        let mut tx = self.pool.begin().await?;

        let location_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO lieux (adresse, ville, code_postal, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&listing.address)
        .bind(&listing.city)
        .bind(&listing.postal_code)
        .bind(listing.coordinate.map(|c| c.latitude))
        .bind(listing.coordinate.map(|c| c.longitude))
        .fetch_one(&mut *tx)
        .await?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO annonces (
                titre, description, prix, type_bien, surface, nb_chambres, nb_salles_bain,
                lieu_id, nom_agent, telephone_agent, email_agent, caracteristiques, images
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id
            "#,
        )
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.property_type.as_str())
        .bind(listing.surface)
        .bind(to_db_count(listing.bedrooms, "nb_chambres")?)
        .bind(to_db_count(listing.bathrooms, "nb_salles_bain")?)
        .bind(location_id)
        .bind(&listing.agent.name)
        .bind(&listing.agent.phone)
        .bind(&listing.agent.email)
        .bind(&listing.characteristics)
        .bind(&listing.images)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Created listing {} at location {}", id, location_id);

        self.listing(id)
            .await?
            .ok_or_else(|| StoreError::InvalidData(format!("listing {} vanished after insert", id)))
    }

    async fn update_listing(&self, id: i64, listing: NewListing) -> Result<Option<Listing>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let location_id: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE annonces
            SET titre = $2, description = $3, prix = $4, type_bien = $5, surface = $6,
                nb_chambres = $7, nb_salles_bain = $8, nom_agent = $9, telephone_agent = $10,
                email_agent = $11, caracteristiques = $12, images = $13,
                date_modification = NOW()
            WHERE id = $1 AND actif
            RETURNING lieu_id
            "#,
        )
        .bind(id)
        .bind(&listing.title)
        .bind(&listing.description)
        .bind(listing.price)
        .bind(listing.property_type.as_str())
        .bind(listing.surface)
        .bind(to_db_count(listing.bedrooms, "nb_chambres")?)
        .bind(to_db_count(listing.bathrooms, "nb_salles_bain")?)
        .bind(&listing.agent.name)
        .bind(&listing.agent.phone)
        .bind(&listing.agent.email)
        .bind(&listing.characteristics)
        .bind(&listing.images)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(location_id) = location_id else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            UPDATE lieux
            SET adresse = $2, ville = $3, code_postal = $4, latitude = $5, longitude = $6
            WHERE id = $1
            "#,
        )
        .bind(location_id)
        .bind(&listing.address)
        .bind(&listing.city)
        .bind(&listing.postal_code)
        .bind(listing.coordinate.map(|c| c.latitude))
        .bind(listing.coordinate.map(|c| c.longitude))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Updated listing {}", id);

        self.listing(id).await
    }

    async fn retire_listing(&self, id: i64) -> Result<bool, StoreError> {
        let retired = sqlx::query(
            "UPDATE annonces SET actif = FALSE, date_modification = NOW() WHERE id = $1 AND actif",
        )
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(retired > 0)
    }

    async fn alerts(&self, owner_id: i64) -> Result<Vec<SavedAlert>, StoreError> {
        let query = format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alertes_recherche
            WHERE utilisateur_id = $1
            ORDER BY date_creation DESC, id DESC
            "#
        );

        let rows = sqlx::query(&query).bind(owner_id).fetch_all(&self.pool).await?;

        rows.iter().map(alert_from_row).collect()
    }

    async fn alert(&self, id: i64, owner_id: i64) -> Result<Option<SavedAlert>, StoreError> {
        let query = format!(
            r#"
            SELECT {ALERT_COLUMNS}
            FROM alertes_recherche
            WHERE id = $1 AND utilisateur_id = $2
            "#
        );

        sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(alert_from_row)
            .transpose()
    }

    async fn create_alert(&self, owner_id: i64, alert: NewAlert) -> Result<SavedAlert, StoreError> {
        let query = format!(
            r#"
            INSERT INTO alertes_recherche (
                utilisateur_id, nom, prix_min, prix_max, type_bien, ville, surface_min,
                nb_chambres_min, nb_salles_bain_min, mots_cles, latitude, longitude, rayon_km,
                frequence, active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {ALERT_COLUMNS}
            "#
        );

        let row = sqlx::query(&query)
            .bind(owner_id)
            .bind(&alert.name)
            .bind(alert.price_min)
            .bind(alert.price_max)
            .bind(alert.property_type.map(|t| t.as_str()))
            .bind(&alert.city)
            .bind(alert.surface_min)
            .bind(to_db_count(alert.bedrooms_min, "nb_chambres_min")?)
            .bind(to_db_count(alert.bathrooms_min, "nb_salles_bain_min")?)
            .bind(&alert.keywords)
            .bind(alert.latitude)
            .bind(alert.longitude)
            .bind(alert.radius_km)
            .bind(alert.frequency.as_str())
            .bind(alert.is_active)
            .fetch_one(&self.pool)
            .await?;

        let saved = alert_from_row(&row)?;
        tracing::info!("User {} saved alert {}", owner_id, saved.id);

        Ok(saved)
    }

    async fn update_alert(
        &self,
        id: i64,
        owner_id: i64,
        alert: NewAlert,
    ) -> Result<Option<SavedAlert>, StoreError> {
        let query = format!(
            r#"
            UPDATE alertes_recherche
            SET nom = $3, prix_min = $4, prix_max = $5, type_bien = $6, ville = $7,
                surface_min = $8, nb_chambres_min = $9, nb_salles_bain_min = $10,
                mots_cles = $11, latitude = $12, longitude = $13, rayon_km = $14,
                frequence = $15, active = $16
            WHERE id = $1 AND utilisateur_id = $2
            RETURNING {ALERT_COLUMNS}
            "#
        );

        sqlx::query(&query)
            .bind(id)
            .bind(owner_id)
            .bind(&alert.name)
            .bind(alert.price_min)
            .bind(alert.price_max)
            .bind(alert.property_type.map(|t| t.as_str()))
            .bind(&alert.city)
            .bind(alert.surface_min)
            .bind(to_db_count(alert.bedrooms_min, "nb_chambres_min")?)
            .bind(to_db_count(alert.bathrooms_min, "nb_salles_bain_min")?)
            .bind(&alert.keywords)
            .bind(alert.latitude)
            .bind(alert.longitude)
            .bind(alert.radius_km)
            .bind(alert.frequency.as_str())
            .bind(alert.is_active)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(alert_from_row)
            .transpose()
    }

    async fn delete_alert(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM alertes_recherche WHERE id = $1 AND utilisateur_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn toggle_alert(&self, id: i64, owner_id: i64) -> Result<Option<bool>, StoreError> {
        let query = r#"
            UPDATE alertes_recherche
            SET active = NOT active
            WHERE id = $1 AND utilisateur_id = $2
            RETURNING active
        "#;

        let active: Option<bool> = sqlx::query_scalar(query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(active)
    }

    async fn favorites(&self, owner_id: i64) -> Result<Vec<Favorite>, StoreError> {
        let query = format!(
            r#"
            SELECT f.id AS favori_id, f.utilisateur_id, f.date_ajout, {LISTING_COLUMNS}
            FROM favoris f
            JOIN annonces a ON a.id = f.annonce_id
            JOIN lieux l ON l.id = a.lieu_id
            WHERE f.utilisateur_id = $1
            ORDER BY f.date_ajout DESC, f.id DESC
            "#
        );

        let rows = sqlx::query(&query).bind(owner_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<Favorite, StoreError> {
                Ok(Favorite {
                    id: row.try_get("favori_id")?,
                    owner_id: row.try_get("utilisateur_id")?,
                    listing: listing_from_row(row)?,
                    added_at: row.try_get("date_ajout")?,
                })
            })
            .collect()
    }

    async fn toggle_favorite(&self, owner_id: i64, listing_id: i64) -> Result<Option<bool>, StoreError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM annonces WHERE id = $1 AND actif")
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;

        if exists.is_none() {
            return Ok(None);
        }

        let removed = sqlx::query("DELETE FROM favoris WHERE utilisateur_id = $1 AND annonce_id = $2")
            .bind(owner_id)
            .bind(listing_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            tracing::debug!("User {} removed favorite {}", owner_id, listing_id);
            return Ok(Some(false));
        }

        sqlx::query(
            r#"
            INSERT INTO favoris (utilisateur_id, annonce_id, date_ajout)
            VALUES ($1, $2, NOW())
            ON CONFLICT (utilisateur_id, annonce_id) DO NOTHING
            "#,
        )
        .bind(owner_id)
        .bind(listing_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!("User {} added favorite {}", owner_id, listing_id);

        Ok(Some(true))
    }

    async fn delete_favorite(&self, id: i64, owner_id: i64) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM favoris WHERE id = $1 AND utilisateur_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn listing_from_row(row: &PgRow) -> Result<Listing, StoreError> {
    let property_type: String = row.try_get("type_bien")?;

    Ok(Listing {
        id: row.try_get("id")?,
        title: row.try_get("titre")?,
        description: row.try_get("description")?,
        price: row.try_get("prix")?,
        property_type: property_type.parse::<PropertyType>().map_err(StoreError::InvalidData)?,
        surface: row.try_get("surface")?,
        bedrooms: from_db_count(row.try_get("nb_chambres")?),
        bathrooms: from_db_count(row.try_get("nb_salles_bain")?),
        location: Location {
            id: row.try_get("lieu_id")?,
            address: row.try_get("adresse")?,
            city: row.try_get("ville")?,
            postal_code: row.try_get("code_postal")?,
            coordinate: Coordinate::from_parts(row.try_get("latitude")?, row.try_get("longitude")?),
        },
        is_active: row.try_get("actif")?,
        agent: AgentContact {
            name: row.try_get("nom_agent")?,
            phone: row.try_get("telephone_agent")?,
            email: row.try_get("email_agent")?,
        },
        characteristics: row.try_get("caracteristiques")?,
        images: row.try_get("images")?,
        created_at: row.try_get("date_creation")?,
        updated_at: row.try_get("date_modification")?,
    })
}

fn alert_from_row(row: &PgRow) -> Result<SavedAlert, StoreError> {
    let property_type: Option<String> = row.try_get("type_bien")?;
    let frequency: String = row.try_get("frequence")?;

    Ok(SavedAlert {
        id: row.try_get("id")?,
        owner_id: row.try_get("utilisateur_id")?,
        name: row.try_get("nom")?,
        price_min: row.try_get("prix_min")?,
        price_max: row.try_get("prix_max")?,
        property_type: property_type
            .filter(|t| !t.is_empty())
            .map(|t| t.parse::<PropertyType>())
            .transpose()
            .map_err(StoreError::InvalidData)?,
        city: row.try_get("ville")?,
        surface_min: row.try_get("surface_min")?,
        bedrooms_min: from_db_count(row.try_get("nb_chambres_min")?),
        bathrooms_min: from_db_count(row.try_get("nb_salles_bain_min")?),
        keywords: row.try_get("mots_cles")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        radius_km: row.try_get("rayon_km")?,
        frequency: frequency.parse::<AlertFrequency>().map_err(StoreError::InvalidData)?,
        is_active: row.try_get("active")?,
        created_at: row.try_get("date_creation")?,
        last_notified_at: row.try_get("derniere_notification")?,
    })
}

/// Counts are stored as INTEGER with a non-negative check
fn from_db_count(value: Option<i32>) -> Option<u32> {
    value.and_then(|n| u32::try_from(n).ok())
}

fn to_db_count(value: Option<u32>, column: &str) -> Result<Option<i32>, StoreError> {
    value
        .map(i32::try_from)
        .transpose()
        .map_err(|_| StoreError::InvalidData(format!("{} is out of range", column)))
}
