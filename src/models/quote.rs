// src/models/quote.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::client::Client;
use crate::models::product::Product;

// Situação do orçamento. Enumeração plana: a edição pode levar de qualquer
// status para qualquer outro, não há grafo de transições.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Pending,
    Analyzing,
    Approved,
    Rejected,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Pending => "pending",
            QuoteStatus::Analyzing => "analyzing",
            QuoteStatus::Approved => "approved",
            QuoteStatus::Rejected => "rejected",
        }
    }

    // Ativo = em andamento ou aprovado. Rascunhos e recusados ficam de fora.
    pub fn is_active(&self) -> bool {
        !matches!(self, QuoteStatus::Draft | QuoteStatus::Rejected)
    }

    // Finalizado = entrou no denominador da taxa de conversão.
    pub fn is_finalized(&self) -> bool {
        matches!(self, QuoteStatus::Approved | QuoteStatus::Rejected)
    }
}

// Alíquotas percentuais aplicadas sobre o subtotal do orçamento.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct TaxDetails {
    #[schema(example = 3.0)]
    pub iss: f64,
    #[schema(example = 0.65)]
    pub pis: f64,
    #[schema(example = 3.0)]
    pub cofins: f64,
    pub others: Option<String>,
}

impl TaxDetails {
    // Percentual agregado usado no cálculo do total.
    pub fn rate(&self) -> f64 {
        self.iss + self.pis + self.cofins
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub title: String,
    pub client_id: i64,
    pub status: QuoteStatus,

    // Derivado dos itens pelo calculador e armazenado junto.
    pub total: f64,

    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub payment_terms: Option<String>,
    pub custom_payment: Option<String>,
    pub delivery_time: Option<String>,
    pub include_taxes: bool,

    #[sqlx(flatten)]
    pub tax_details: TaxDetails,

    pub created_at: DateTime<Utc>,
}

// Linha de um orçamento. Sem ciclo de vida próprio: ao salvar o orçamento,
// os itens antigos são removidos e os novos inseridos em bloco.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: i64,
    pub quote_id: i64,
    pub product_id: i64,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub discount: f64,

    // Derivado: quantity * unitPrice * (1 - discount/100).
    pub subtotal: f64,
}

// Orçamento da listagem, com o cliente resolvido em memória.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteWithClient {
    #[serde(flatten)]
    pub quote: Quote,
    pub client: Option<Client>,
}

// Item com o produto resolvido (pode não existir mais no catálogo).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteItemDetail {
    #[serde(flatten)]
    pub item: QuoteItem,
    pub product: Option<Product>,
}

// Orçamento completo: cabeçalho, cliente e itens com produtos.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub client: Option<Client>,
    pub items: Vec<QuoteItemDetail>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemInput {
    pub product_id: i64,
    #[validate(range(min = 1.0, message = "A quantidade mínima é 1."))]
    pub quantity: f64,
    #[validate(range(min = 0.0, message = "O preço unitário não pode ser negativo."))]
    pub unit_price: f64,
    #[validate(range(min = 0.0, max = 100.0, message = "O desconto deve estar entre 0 e 100."))]
    pub discount: f64,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuoteRequest {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub client_id: i64,
    pub status: QuoteStatus,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub payment_terms: Option<String>,
    pub custom_payment: Option<String>,
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub include_taxes: bool,

    // Quando ausente e includeTaxes estiver ligado, as alíquotas padrão da
    // empresa são aplicadas.
    pub tax_details: Option<TaxDetails>,

    #[validate(nested)]
    pub items: Vec<QuoteItemInput>,
}

// Atualização substitui o orçamento inteiro, itens inclusive.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateQuoteRequest {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub client_id: i64,
    pub status: QuoteStatus,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub payment_terms: Option<String>,
    pub custom_payment: Option<String>,
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub include_taxes: bool,
    pub tax_details: Option<TaxDetails>,

    #[validate(nested)]
    pub items: Vec<QuoteItemInput>,
}
