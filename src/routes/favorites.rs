use actix_web::{web, HttpResponse};

use crate::error::{ApiError, SearchError};
use crate::models::{FavoriteDto, ToggleFavoriteResponse};
use crate::routes::{AppState, Requester};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/favoris", web::get().to(list_favorites))
        .route("/favoris/toggle/{annonce_id}", web::post().to(toggle_favorite))
        .route("/favoris/{id}", web::get().to(favorite_detail))
        .route("/favoris/{id}", web::delete().to(delete_favorite));
}

/// Favorites of the requester, most recent first
async fn list_favorites(
    state: web::Data<AppState>,
    requester: Requester,
) -> Result<HttpResponse, ApiError> {
    let favorites = state.store.favorites(requester.0).await?;
    let body: Vec<FavoriteDto> = favorites.iter().map(FavoriteDto::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn favorite_detail(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let favorite = state
        .store
        .favorites(requester.0)
        .await?
        .into_iter()
        .find(|f| f.id == id)
        .ok_or_else(|| SearchError::not_found(format!("favori {}", id)))?;

    Ok(HttpResponse::Ok().json(FavoriteDto::from(&favorite)))
}

async fn delete_favorite(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if !state.store.delete_favorite(id, requester.0).await? {
        return Err(SearchError::not_found(format!("favori {}", id)).into());
    }

    Ok(HttpResponse::NoContent().finish())
}

/// Add the listing to the requester's favorites, or remove it if already there
async fn toggle_favorite(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let listing_id = path.into_inner();

    let is_favorite = state
        .store
        .toggle_favorite(requester.0, listing_id)
        .await?
        .ok_or_else(|| SearchError::not_found(format!("annonce {}", listing_id)))?;

    tracing::info!(
        "User {} {} listing {}",
        requester.0,
        if is_favorite { "favorited" } else { "unfavorited" },
        listing_id
    );

    let message = if is_favorite {
        "Annonce ajoutée aux favoris"
    } else {
        "Annonce retirée des favoris"
    };

    Ok(HttpResponse::Ok().json(ToggleFavoriteResponse {
        message: message.to_string(),
        is_favorite,
    }))
}
