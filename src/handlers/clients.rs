// src/handlers/clients.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::client::{Client, CreateClientRequest, UpdateClientRequest},
};

#[derive(Debug, Deserialize)]
pub struct ClientListQuery {
    pub search: Option<String>,
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Lista de clientes", body = Vec<Client>)
    ),
    params(
        ("search" = Option<String>, Query, description = "Filtra por nome, documento ou e-mail")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<Vec<Client>>, AppError> {
    let clients = app_state.client_repo.list(query.search.as_deref()).await?;
    Ok(Json(clients))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    responses(
        (status = 200, description = "Cliente encontrado", body = Client),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Client>, AppError> {
    let client = app_state
        .client_repo
        .find_by_id(id)
        .await?
        .ok_or(AppError::ClientNotFound)?;
    Ok(Json(client))
}

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = CreateClientRequest,
    responses(
        (status = 201, description = "Cliente criado", body = Client),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let client = app_state.client_repo.create(payload).await?;
    tracing::info!("👤 Cliente #{} cadastrado.", client.id);

    Ok((StatusCode::CREATED, Json(client)))
}

// PUT /api/clients/{id}
#[utoipa::path(
    put,
    path = "/api/clients/{id}",
    tag = "Clientes",
    request_body = UpdateClientRequest,
    responses(
        (status = 200, description = "Cliente atualizado", body = Client),
        (status = 404, description = "Cliente não encontrado"),
        (status = 400, description = "Dados inválidos")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn update_client(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<Client>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let client = app_state.client_repo.update(id, payload).await?;
    Ok(Json(client))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    responses(
        (status = 204, description = "Cliente excluído"),
        (status = 404, description = "Cliente não encontrado"),
        (status = 409, description = "Cliente referenciado por orçamentos")
    ),
    params(("id" = i64, Path, description = "ID do cliente")),
    security(("api_jwt" = []))
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.client_repo.delete(id).await?;
    tracing::info!("🗑️ Cliente #{} excluído.", id);
    Ok(StatusCode::NO_CONTENT)
}
