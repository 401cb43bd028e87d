// src/models/settings.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::quote::TaxDetails;

// Registro único com os dados da empresa emissora e as alíquotas padrão.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub id: i64,

    #[schema(example = "Minha Empresa")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub document: Option<String>,

    #[schema(example = "contato@minhaempresa.com.br")]
    pub email: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    pub address: Option<String>,

    // URL ou data-URL base64 da logomarca impressa nos documentos.
    pub logo: Option<String>,

    #[schema(example = "BRL")]
    pub currency: String,

    #[sqlx(flatten)]
    pub default_tax_settings: TaxDetails,
}

// Atualização substitui todos os campos editáveis de uma vez.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, message = "O nome da empresa é obrigatório."))]
    pub name: String,
    pub document: Option<String>,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub logo: Option<String>,
    #[validate(length(min = 1, message = "A moeda é obrigatória."))]
    pub currency: String,
    pub default_tax_settings: TaxDetails,
}
