// src/models/dashboard.rs

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::product::ProductKind;
use crate::models::quote::QuoteWithClient;

// Fotografia do painel num instante: os cards do topo, tendências frente ao
// mês anterior, listas de destaque e as duas séries de gráfico.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_quotes: i64,
    pub monthly_total: f64,
    pub conversion_rate: f64,
    pub active_clients: i64,

    // Variação percentual frente ao mês anterior. `None` quando o mês
    // anterior não tem dados para comparar.
    pub trend_active_quotes: Option<f64>,
    pub trend_monthly_total: Option<f64>,
    pub trend_conversion_rate: Option<f64>,
    pub trend_active_clients: Option<f64>,

    pub recent_quotes: Vec<QuoteWithClient>,
    pub top_clients: Vec<TopClient>,
    pub top_products: Vec<TopProduct>,

    pub bar_chart_data: Vec<ProductMonthlyQuantities>,
    pub line_chart_data: Vec<MonthlyQuoteCounts>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopClient {
    pub id: i64,
    pub name: String,
    pub total: f64,
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub id: i64,
    pub name: String,
    // `None` quando o produto não existe mais no catálogo.
    pub kind: Option<ProductKind>,
    pub quantity: f64,
    pub value: f64,
}

// Quantidades mensais dos três produtos mais orçados (gráfico de barras).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductMonthlyQuantities {
    pub month: String,
    pub products: Vec<ProductQuantity>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuantity {
    pub name: String,
    pub quantity: f64,
}

// Orçamentos criados e aprovados por mês (gráfico de linha).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyQuoteCounts {
    pub month: String,
    pub quotes: i64,
    pub approved: i64,
}
