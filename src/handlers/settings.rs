// src/handlers/settings.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

// GET /api/settings. A primeira leitura semeia o registro com os padrões.
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses(
        (status = 200, description = "Dados da empresa emissora", body = CompanySettings)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
) -> Result<Json<CompanySettings>, AppError> {
    let settings = app_state.settings_repo.get_or_create().await?;
    Ok(Json(settings))
}

// PUT /api/settings
#[utoipa::path(
    put,
    path = "/api/settings",
    tag = "Configurações",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações atualizadas", body = CompanySettings),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<Json<CompanySettings>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = app_state.settings_repo.update(payload).await?;
    tracing::info!("🏢 Configurações da empresa atualizadas.");

    Ok(Json(settings))
}
