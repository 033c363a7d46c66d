use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::error::{ApiError, SearchError};
use crate::models::{AlertDto, AlertPreviewResponse, CreateAlertRequest, SavedAlert, ToggleAlertResponse};
use crate::routes::{AppState, Requester};

/// Configure saved alert routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/alertes", web::get().to(list_alerts))
        .route("/alertes", web::post().to(create_alert))
        .route("/alertes/toggle/{id}", web::post().to(toggle_alert))
        .route("/alertes/test/{id}", web::get().to(preview_alert))
        .route("/alertes/{id}", web::get().to(alert_detail))
        .route("/alertes/{id}", web::put().to(update_alert))
        .route("/alertes/{id}", web::delete().to(delete_alert));
}

async fn owned_alert(state: &AppState, id: i64, requester: Requester) -> Result<SavedAlert, ApiError> {
    state
        .store
        .alert(id, requester.0)
        .await?
        .ok_or_else(|| SearchError::not_found(format!("alerte {}", id)).into())
}

async fn list_alerts(
    state: web::Data<AppState>,
    requester: Requester,
) -> Result<HttpResponse, ApiError> {
    let alerts = state.store.alerts(requester.0).await?;
    let body: Vec<AlertDto> = alerts.iter().map(AlertDto::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

async fn create_alert(
    state: web::Data<AppState>,
    requester: Requester,
    body: web::Json<CreateAlertRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    body.check()?;

    let alert = state
        .store
        .create_alert(requester.0, body.into_inner().into_new_alert())
        .await?;

    tracing::info!("User {} saved alert {} ({})", requester.0, alert.id, alert.name);

    Ok(HttpResponse::Created().json(AlertDto::from(&alert)))
}

async fn alert_detail(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let alert = owned_alert(&state, path.into_inner(), requester).await?;
    Ok(HttpResponse::Ok().json(AlertDto::from(&alert)))
}

async fn update_alert(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
    body: web::Json<CreateAlertRequest>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;
    body.check()?;

    let id = path.into_inner();

    let alert = state
        .store
        .update_alert(id, requester.0, body.into_inner().into_new_alert())
        .await?
        .ok_or_else(|| SearchError::not_found(format!("alerte {}", id)))?;

    Ok(HttpResponse::Ok().json(AlertDto::from(&alert)))
}

async fn delete_alert(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    if !state.store.delete_alert(id, requester.0).await? {
        return Err(SearchError::not_found(format!("alerte {}", id)).into());
    }

    tracing::info!("User {} deleted alert {}", requester.0, id);

    Ok(HttpResponse::NoContent().finish())
}

async fn toggle_alert(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();

    let active = state
        .store
        .toggle_alert(id, requester.0)
        .await?
        .ok_or_else(|| SearchError::not_found(format!("alerte {}", id)))?;

    let message = if active { "Alerte activée" } else { "Alerte désactivée" };

    Ok(HttpResponse::Ok().json(ToggleAlertResponse {
        message: message.to_string(),
        active,
    }))
}

/// Preview what a saved alert matches right now
///
/// GET /api/v1/alertes/test/{id}
///
/// Read-only: the alert's activation flag and notification timestamp are
/// left untouched, and inactive alerts can be previewed too.
async fn preview_alert(
    state: web::Data<AppState>,
    requester: Requester,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let alert = owned_alert(&state, path.into_inner(), requester).await?;
    let universe = state.store.active_listings().await?;

    let preview = state.matcher.preview_alert(&alert, universe);

    tracing::info!(
        "Alert {} preview: {} matching listings",
        alert.id,
        preview.matched_count
    );

    Ok(HttpResponse::Ok().json(AlertPreviewResponse::new(&alert, &preview)))
}
