// src/handlers/dashboard.rs

use axum::{extract::State, Json};

use crate::{common::error::AppError, config::AppState, models::dashboard::DashboardStats};

// GET /api/dashboard/stats
#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    tag = "Dashboard",
    responses(
        (status = 200, description = "Indicadores, tendências, rankings e séries dos gráficos", body = DashboardStats),
        (status = 401, description = "Não autorizado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_stats(
    State(app_state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    let stats = app_state.dashboard_service.get_stats().await?;
    Ok(Json(stats))
}
