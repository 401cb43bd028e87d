// src/handlers/exports.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::{common::error::AppError, config::AppState, models::quote::QuoteStatus};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// Mesmos filtros da listagem de orçamentos: o arquivo sai como a tela mostra.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportQuery {
    pub status: Option<QuoteStatus>,
    pub client_id: Option<i64>,
    pub search: Option<String>,
}

// GET /api/exports/quotes/pdf
#[utoipa::path(
    get,
    path = "/api/exports/quotes/pdf",
    tag = "Exportações",
    responses(
        (status = 200, description = "Relatório tabular em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 500, description = "Fontes do PDF não encontradas")
    ),
    params(
        ("status" = Option<QuoteStatus>, Query, description = "Filtra por situação"),
        ("clientId" = Option<i64>, Query, description = "Filtra por cliente"),
        ("search" = Option<String>, Query, description = "Filtra por título")
    ),
    security(("api_jwt" = []))
)]
pub async fn quotes_report_pdf(
    State(app_state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state
        .export_service
        .quotes_report_pdf(query.status, query.client_id, query.search.as_deref())
        .await?;

    // Configura os Headers para o navegador baixar o PDF
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"orcamentos.pdf\"",
        ),
    ];

    Ok((headers, pdf_bytes).into_response())
}

// GET /api/exports/quotes/xlsx
#[utoipa::path(
    get,
    path = "/api/exports/quotes/xlsx",
    tag = "Exportações",
    responses(
        (status = 200, description = "Relatório em planilha, sem truncamento de campos", body = Vec<u8>, content_type = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")
    ),
    params(
        ("status" = Option<QuoteStatus>, Query, description = "Filtra por situação"),
        ("clientId" = Option<i64>, Query, description = "Filtra por cliente"),
        ("search" = Option<String>, Query, description = "Filtra por título")
    ),
    security(("api_jwt" = []))
)]
pub async fn quotes_report_xlsx(
    State(app_state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let xlsx_bytes = app_state
        .export_service
        .quotes_report_xlsx(query.status, query.client_id, query.search.as_deref())
        .await?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_MIME),
        (
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"orcamentos.xlsx\"",
        ),
    ];

    Ok((headers, xlsx_bytes).into_response())
}

// GET /api/quotes/{id}/pdf
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/pdf",
    tag = "Exportações",
    responses(
        (status = 200, description = "Documento do orçamento em PDF", body = Vec<u8>, content_type = "application/pdf"),
        (status = 404, description = "Orçamento não encontrado")
    ),
    params(("id" = i64, Path, description = "ID do orçamento")),
    security(("api_jwt" = []))
)]
pub async fn quote_document_pdf(
    State(app_state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let pdf_bytes = app_state.export_service.quote_document_pdf(id).await?;

    let disposition = format!("attachment; filename=\"orcamento_{}.pdf\"", id);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf"),
        (header::CONTENT_DISPOSITION, disposition.as_str()),
    ];

    Ok((headers, pdf_bytes).into_response())
}
