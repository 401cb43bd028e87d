// src/services/dashboard_service.rs

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Utc};

use crate::{
    common::{error::AppError, format::month_abbr_pt},
    db::{ClientRepository, ProductRepository, QuoteRepository},
    models::{
        client::Client,
        dashboard::{
            DashboardStats, MonthlyQuoteCounts, ProductMonthlyQuantities, ProductQuantity,
            TopClient, TopProduct,
        },
        product::Product,
        quote::{Quote, QuoteItem, QuoteStatus, QuoteWithClient},
    },
};

const RECENT_QUOTES: usize = 5;
const TOP_CLIENTS: usize = 5;
const TOP_PRODUCTS: usize = 5;
const CHART_PRODUCTS: usize = 3;
const CHART_MONTHS: u32 = 6;

#[derive(Clone)]
pub struct DashboardService {
    quote_repo: QuoteRepository,
    client_repo: ClientRepository,
    product_repo: ProductRepository,
}

impl DashboardService {
    pub fn new(
        quote_repo: QuoteRepository,
        client_repo: ClientRepository,
        product_repo: ProductRepository,
    ) -> Self {
        Self { quote_repo, client_repo, product_repo }
    }

    // Carrega as quatro coleções e delega para o cálculo puro. Se qualquer
    // leitura falhar, nenhum resultado parcial é devolvido.
    pub async fn get_stats(&self) -> Result<DashboardStats, AppError> {
        let quotes = self.quote_repo.list_all().await?;
        let items = self.quote_repo.list_all_items().await?;
        let clients = self.client_repo.list(None).await?;
        let products = self.product_repo.list(None, None).await?;

        Ok(compute_stats(&quotes, &clients, &products, &items, Utc::now()))
    }
}

// Fotografia do painel. Função pura do estado e do instante recebido.
pub fn compute_stats(
    quotes: &[Quote],
    clients: &[Client],
    products: &[Product],
    items: &[QuoteItem],
    now: DateTime<Utc>,
) -> DashboardStats {
    let client_by_id: HashMap<i64, &Client> = clients.iter().map(|c| (c.id, c)).collect();
    let product_by_id: HashMap<i64, &Product> = products.iter().map(|p| (p.id, p)).collect();

    let current = year_month(&now);
    let previous = months_back(current, 1);

    // --- Cards do topo -----------------------------------------------------

    let active_quotes = quotes.iter().filter(|q| q.status.is_active()).count() as i64;

    let monthly_total: f64 = quotes
        .iter()
        .filter(|q| year_month(&q.created_at) == current)
        .map(|q| q.total)
        .sum();

    let approved = quotes.iter().filter(|q| q.status == QuoteStatus::Approved).count();
    let rejected = quotes.iter().filter(|q| q.status == QuoteStatus::Rejected).count();
    let conversion_rate = percentage(approved, approved + rejected);

    let active_clients = quotes
        .iter()
        .filter(|q| q.status.is_active())
        .map(|q| q.client_id)
        .collect::<HashSet<_>>()
        .len() as i64;

    // --- Tendências --------------------------------------------------------
    // Cada métrica comparada com a equivalente restrita ao mês anterior.
    // Sem dados no mês anterior não há comparação possível (None).

    let month_metrics = |ym: (i32, u32)| -> MonthSlice {
        let in_month: Vec<&Quote> = quotes
            .iter()
            .filter(|q| year_month(&q.created_at) == ym)
            .collect();

        let approved = in_month.iter().filter(|q| q.status == QuoteStatus::Approved).count();
        let rejected = in_month.iter().filter(|q| q.status == QuoteStatus::Rejected).count();

        MonthSlice {
            active: in_month.iter().filter(|q| q.status.is_active()).count() as f64,
            total: in_month.iter().map(|q| q.total).sum(),
            conversion: percentage(approved, approved + rejected),
            clients: in_month
                .iter()
                .filter(|q| q.status.is_active())
                .map(|q| q.client_id)
                .collect::<HashSet<_>>()
                .len() as f64,
        }
    };

    let this_month = month_metrics(current);
    let last_month = month_metrics(previous);

    // --- Destaques ---------------------------------------------------------

    let mut recent: Vec<&Quote> = quotes.iter().collect();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    let recent_quotes = recent
        .into_iter()
        .take(RECENT_QUOTES)
        .map(|quote| QuoteWithClient {
            quote: quote.clone(),
            client: client_by_id.get(&quote.client_id).map(|c| (*c).clone()),
        })
        .collect();

    let top_clients = rank_clients(quotes, &client_by_id);
    let ranked_products = rank_products(items, &product_by_id);

    // --- Séries dos gráficos (6 meses, do mais antigo ao atual) ------------

    let months: Vec<(i32, u32)> = (0..CHART_MONTHS)
        .rev()
        .map(|back| months_back(current, back))
        .collect();

    let quote_month: HashMap<i64, (i32, u32)> =
        quotes.iter().map(|q| (q.id, year_month(&q.created_at))).collect();

    let bar_chart_data = months
        .iter()
        .map(|ym| ProductMonthlyQuantities {
            month: month_abbr_pt(ym.1).to_string(),
            products: ranked_products
                .iter()
                .take(CHART_PRODUCTS)
                .map(|top| ProductQuantity {
                    name: top.name.clone(),
                    quantity: items
                        .iter()
                        .filter(|i| {
                            i.product_id == top.id && quote_month.get(&i.quote_id) == Some(ym)
                        })
                        .map(|i| i.quantity)
                        .sum(),
                })
                .collect(),
        })
        .collect();

    let line_chart_data = months
        .iter()
        .map(|ym| {
            let in_month: Vec<&Quote> = quotes
                .iter()
                .filter(|q| year_month(&q.created_at) == *ym)
                .collect();
            MonthlyQuoteCounts {
                month: month_abbr_pt(ym.1).to_string(),
                quotes: in_month.len() as i64,
                approved: in_month.iter().filter(|q| q.status == QuoteStatus::Approved).count()
                    as i64,
            }
        })
        .collect();

    DashboardStats {
        active_quotes,
        monthly_total,
        conversion_rate,
        active_clients,
        trend_active_quotes: trend(this_month.active, last_month.active),
        trend_monthly_total: trend(this_month.total, last_month.total),
        trend_conversion_rate: trend(this_month.conversion, last_month.conversion),
        trend_active_clients: trend(this_month.clients, last_month.clients),
        recent_quotes,
        top_clients,
        top_products: ranked_products.into_iter().take(TOP_PRODUCTS).collect(),
        bar_chart_data,
        line_chart_data,
    }
}

struct MonthSlice {
    active: f64,
    total: f64,
    conversion: f64,
    clients: f64,
}

// Até 5 clientes por soma de valor orçado, com a taxa de conversão
// individual (aprovados sobre todos os orçamentos do cliente).
fn rank_clients(quotes: &[Quote], client_by_id: &HashMap<i64, &Client>) -> Vec<TopClient> {
    struct Acc {
        total: f64,
        quotes: usize,
        approved: usize,
    }

    let mut by_client: HashMap<i64, Acc> = HashMap::new();
    for quote in quotes {
        let acc = by_client
            .entry(quote.client_id)
            .or_insert(Acc { total: 0.0, quotes: 0, approved: 0 });
        acc.total += quote.total;
        acc.quotes += 1;
        if quote.status == QuoteStatus::Approved {
            acc.approved += 1;
        }
    }

    let mut ranked: Vec<(i64, Acc)> = by_client.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total.total_cmp(&a.1.total).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .take(TOP_CLIENTS)
        .map(|(id, acc)| TopClient {
            id,
            name: client_by_id
                .get(&id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| "Cliente não encontrado".to_string()),
            total: acc.total,
            conversion_rate: percentage(acc.approved, acc.quotes),
        })
        .collect()
}

// Produtos por quantidade orçada acumulada, anotados com o valor somado.
fn rank_products(items: &[QuoteItem], product_by_id: &HashMap<i64, &Product>) -> Vec<TopProduct> {
    struct Acc {
        quantity: f64,
        value: f64,
    }

    let mut by_product: HashMap<i64, Acc> = HashMap::new();
    for item in items {
        let acc = by_product
            .entry(item.product_id)
            .or_insert(Acc { quantity: 0.0, value: 0.0 });
        acc.quantity += item.quantity;
        acc.value += item.subtotal;
    }

    let mut ranked: Vec<(i64, Acc)> = by_product.into_iter().collect();
    ranked.sort_by(|a, b| b.1.quantity.total_cmp(&a.1.quantity).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .map(|(id, acc)| {
            let product = product_by_id.get(&id);
            TopProduct {
                id,
                name: product
                    .map(|p| p.name.clone())
                    .unwrap_or_else(|| "Produto desconhecido".to_string()),
                kind: product.map(|p| p.kind),
                quantity: acc.quantity,
                value: acc.value,
            }
        })
        .collect()
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn trend(current: f64, previous: f64) -> Option<f64> {
    if previous == 0.0 {
        None
    } else {
        Some((current - previous) / previous * 100.0)
    }
}

fn year_month(instant: &DateTime<Utc>) -> (i32, u32) {
    (instant.year(), instant.month())
}

// Aritmética de meses sem construir datas: (ano, mês) N meses atrás.
fn months_back((year, month): (i32, u32), back: u32) -> (i32, u32) {
    let absolute = year * 12 + month as i32 - 1 - back as i32;
    (absolute.div_euclid(12), (absolute.rem_euclid(12) + 1) as u32)
}
