// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

// Diferencia itens de catálogo vendidos por unidade de itens de mão de obra.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ProductKind {
    Product,
    Service,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    #[schema(example = "Instalação Elétrica")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = 250.0)]
    pub price: f64,

    pub kind: ProductKind,

    #[schema(example = "h")]
    pub unit: Option<String>,

    #[schema(example = "SRV-0042")]
    pub internal_code: Option<String>,

    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "O preço não pode ser negativo."))]
    pub price: f64,
    pub kind: ProductKind,
    pub unit: Option<String>,
    pub internal_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0, message = "O preço não pode ser negativo."))]
    pub price: f64,
    pub kind: ProductKind,
    pub unit: Option<String>,
    pub internal_code: Option<String>,
}
