// src/handlers/notifications.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::notification::{CreateNotificationRequest, Notification},
};

// GET /api/notifications
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notificações",
    responses(
        (status = 200, description = "Alertas atuais, do mais novo para o mais antigo", body = Vec<Notification>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_notifications(State(app_state): State<AppState>) -> Json<Vec<Notification>> {
    Json(app_state.notification_service.list().await)
}

// POST /api/notifications
#[utoipa::path(
    post,
    path = "/api/notifications",
    tag = "Notificações",
    request_body = CreateNotificationRequest,
    responses(
        (status = 201, description = "Alerta criado", body = Notification),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_notification(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateNotificationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let notification = app_state.notification_service.add(payload).await?;
    Ok((StatusCode::CREATED, Json(notification)))
}

// PATCH /api/notifications/{id}/read
#[utoipa::path(
    patch,
    path = "/api/notifications/{id}/read",
    tag = "Notificações",
    responses(
        (status = 200, description = "Alerta marcado como lido", body = Notification),
        (status = 404, description = "Alerta não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do alerta")),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Notification>, AppError> {
    let notification = app_state.notification_service.mark_read(id).await?;
    Ok(Json(notification))
}

// POST /api/notifications/{id}/viewed. Remove o alerta e grava a condição de
// origem como vista, para que a próxima varredura não o recrie.
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/viewed",
    tag = "Notificações",
    responses(
        (status = 204, description = "Alerta descartado e condição marcada como vista"),
        (status = 404, description = "Alerta não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do alerta")),
    security(("api_jwt" = []))
)]
pub async fn mark_notification_viewed(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.notification_service.mark_viewed(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/notifications/{id}
#[utoipa::path(
    delete,
    path = "/api/notifications/{id}",
    tag = "Notificações",
    responses(
        (status = 204, description = "Alerta removido"),
        (status = 404, description = "Alerta não encontrado")
    ),
    params(("id" = Uuid, Path, description = "ID do alerta")),
    security(("api_jwt" = []))
)]
pub async fn delete_notification(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    app_state.notification_service.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/notifications
#[utoipa::path(
    delete,
    path = "/api/notifications",
    tag = "Notificações",
    responses((status = 204, description = "Todos os alertas removidos")),
    security(("api_jwt" = []))
)]
pub async fn clear_notifications(
    State(app_state): State<AppState>,
) -> Result<StatusCode, AppError> {
    app_state.notification_service.clear_all().await?;
    Ok(StatusCode::NO_CONTENT)
}
