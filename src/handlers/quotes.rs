// src/handlers/quotes.rs

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
    models::quote::{
        CreateQuoteRequest, QuoteDetail, QuoteStatus, QuoteWithClient, UpdateQuoteRequest,
    },
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteListQuery {
    pub status: Option<QuoteStatus>,
    pub client_id: Option<i64>,
    pub search: Option<String>,
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Orçamentos",
    responses(
        (status = 200, description = "Lista de orçamentos com o cliente resolvido", body = Vec<QuoteWithClient>)
    ),
    params(
        ("status" = Option<QuoteStatus>, Query, description = "Filtra por situação"),
        ("clientId" = Option<i64>, Query, description = "Filtra por cliente"),
        ("search" = Option<String>, Query, description = "Filtra por título")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    Query(query): Query<QuoteListQuery>,
) -> Result<Json<Vec<QuoteWithClient>>, AppError> {
    let quotes = app_state
        .quote_service
        .list(query.status, query.client_id, query.search.as_deref())
        .await?;
    Ok(Json(quotes))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    responses(
        (status = 200, description = "Orçamento completo com itens", body = QuoteDetail),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<QuoteDetail>, AppError> {
    let detail = app_state.quote_service.get_detail(id).await?;
    Ok(Json(detail))
}

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Orçamentos",
    request_body = CreateQuoteRequest,
    responses(
        (status = 201, description = "Orçamento criado com o total calculado", body = QuoteDetail),
        (status = 404, description = "Cliente não encontrado"),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateQuoteRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state.quote_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    request_body = UpdateQuoteRequest,
    responses(
        (status = 200, description = "Orçamento atualizado e recalculado", body = QuoteDetail),
        (status = 404, description = "Orçamento ou cliente não encontrado"),
        (status = 400, description = "Dados inválidos")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuoteRequest>,
) -> Result<Json<QuoteDetail>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let detail = app_state.quote_service.update(id, payload).await?;
    Ok(Json(detail))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Orçamentos",
    responses(
        (status = 204, description = "Orçamento excluído"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    app_state.quote_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
