// src/services/quote_service.rs

use crate::{
    common::error::AppError,
    db::{
        quote_repo::{QuoteItemRecord, QuoteRecord},
        ClientRepository, QuoteRepository, SettingsRepository,
    },
    models::quote::{
        CreateQuoteRequest, QuoteDetail, QuoteItemInput, QuoteStatus, QuoteWithClient, TaxDetails,
        UpdateQuoteRequest,
    },
    services::pricing,
};

#[derive(Clone)]
pub struct QuoteService {
    quote_repo: QuoteRepository,
    client_repo: ClientRepository,
    settings_repo: SettingsRepository,
}

impl QuoteService {
    pub fn new(
        quote_repo: QuoteRepository,
        client_repo: ClientRepository,
        settings_repo: SettingsRepository,
    ) -> Self {
        Self { quote_repo, client_repo, settings_repo }
    }

    pub async fn list(
        &self,
        status: Option<QuoteStatus>,
        client_id: Option<i64>,
        search: Option<&str>,
    ) -> Result<Vec<QuoteWithClient>, AppError> {
        self.quote_repo.list(status, client_id, search).await
    }

    pub async fn get_detail(&self, id: i64) -> Result<QuoteDetail, AppError> {
        self.quote_repo.get_detail(id).await
    }

    pub async fn create(&self, payload: CreateQuoteRequest) -> Result<QuoteDetail, AppError> {
        self.ensure_client(payload.client_id).await?;
        let taxes = self.resolve_taxes(payload.include_taxes, payload.tax_details).await?;

        let items = item_records(payload.items);
        let subtotals: Vec<f64> = items.iter().map(|i| i.subtotal).collect();
        let totals = pricing::quote_totals(&subtotals, payload.include_taxes, &taxes);

        let record = QuoteRecord {
            title: payload.title,
            client_id: payload.client_id,
            status: payload.status,
            total: totals.total,
            valid_until: payload.valid_until,
            notes: payload.notes,
            payment_method: payload.payment_method,
            payment_terms: payload.payment_terms,
            custom_payment: payload.custom_payment,
            delivery_time: payload.delivery_time,
            include_taxes: payload.include_taxes,
            tax_details: taxes,
        };

        let id = self.quote_repo.create_with_items(record, items).await?;
        tracing::info!("📝 Orçamento #{} criado.", id);
        self.quote_repo.get_detail(id).await
    }

    pub async fn update(
        &self,
        id: i64,
        payload: UpdateQuoteRequest,
    ) -> Result<QuoteDetail, AppError> {
        self.ensure_client(payload.client_id).await?;
        let taxes = self.resolve_taxes(payload.include_taxes, payload.tax_details).await?;

        let items = item_records(payload.items);
        let subtotals: Vec<f64> = items.iter().map(|i| i.subtotal).collect();
        let totals = pricing::quote_totals(&subtotals, payload.include_taxes, &taxes);

        let record = QuoteRecord {
            title: payload.title,
            client_id: payload.client_id,
            status: payload.status,
            total: totals.total,
            valid_until: payload.valid_until,
            notes: payload.notes,
            payment_method: payload.payment_method,
            payment_terms: payload.payment_terms,
            custom_payment: payload.custom_payment,
            delivery_time: payload.delivery_time,
            include_taxes: payload.include_taxes,
            tax_details: taxes,
        };

        self.quote_repo.update_with_items(id, record, items).await?;
        self.quote_repo.get_detail(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.quote_repo.delete(id).await?;
        tracing::info!("🗑️ Orçamento #{} removido.", id);
        Ok(())
    }

    async fn ensure_client(&self, client_id: i64) -> Result<(), AppError> {
        self.client_repo
            .find_by_id(client_id)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        Ok(())
    }

    // Alíquotas do orçamento: as enviadas no payload, ou as padrão da empresa
    // quando o orçamento inclui impostos mas não as informou.
    async fn resolve_taxes(
        &self,
        include_taxes: bool,
        requested: Option<TaxDetails>,
    ) -> Result<TaxDetails, AppError> {
        match requested {
            Some(taxes) => Ok(taxes),
            None if include_taxes => {
                let settings = self.settings_repo.get_or_create().await?;
                Ok(settings.default_tax_settings)
            }
            None => Ok(TaxDetails::default()),
        }
    }
}

// Converte os itens do payload recalculando cada subtotal no servidor.
fn item_records(items: Vec<QuoteItemInput>) -> Vec<QuoteItemRecord> {
    items
        .into_iter()
        .map(|item| QuoteItemRecord {
            product_id: item.product_id,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            discount: item.discount,
            subtotal: pricing::item_subtotal(item.quantity, item.unit_price, item.discount),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::models::client::CreateClientRequest;
    use chrono::{Duration, Utc};
    use sqlx::SqlitePool;

    fn service(pool: &SqlitePool) -> QuoteService {
        QuoteService::new(
            QuoteRepository::new(pool.clone()),
            ClientRepository::new(pool.clone()),
            SettingsRepository::new(pool.clone()),
        )
    }

    async fn seed_client(pool: &SqlitePool) -> i64 {
        ClientRepository::new(pool.clone())
            .create(CreateClientRequest {
                name: "Acme".to_string(),
                document: None,
                email: None,
                phone: None,
                address: None,
            })
            .await
            .unwrap()
            .id
    }

    fn payload(client_id: i64, include_taxes: bool) -> CreateQuoteRequest {
        CreateQuoteRequest {
            title: "Instalação elétrica".to_string(),
            client_id,
            status: QuoteStatus::Pending,
            valid_until: Utc::now() + Duration::days(30),
            notes: None,
            payment_method: Some("pix".to_string()),
            payment_terms: None,
            custom_payment: None,
            delivery_time: None,
            include_taxes,
            tax_details: None,
            items: vec![QuoteItemInput {
                product_id: 1,
                quantity: 2.0,
                unit_price: 100.0,
                discount: 10.0,
                description: None,
            }],
        }
    }

    #[tokio::test]
    async fn criar_recalcula_total_com_aliquotas_padrao_da_empresa() {
        let pool = test_pool().await;
        let quotes = service(&pool);
        let client_id = seed_client(&pool).await;

        let detail = quotes.create(payload(client_id, true)).await.unwrap();

        // 180,00 de subtotal + 6,65% (3 + 0,65 + 3) = 191,97
        assert_eq!(detail.quote.tax_details.iss, 3.0);
        assert_eq!(detail.quote.tax_details.pis, 0.65);
        assert!((detail.quote.total - 191.97).abs() < 1e-9);
        assert!((detail.items[0].item.subtotal - 180.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn sem_impostos_o_total_e_a_soma_dos_subtotais() {
        let pool = test_pool().await;
        let quotes = service(&pool);
        let client_id = seed_client(&pool).await;

        let detail = quotes.create(payload(client_id, false)).await.unwrap();
        assert!((detail.quote.total - 180.0).abs() < 1e-9);
        assert_eq!(detail.quote.tax_details, TaxDetails::default());
    }

    #[tokio::test]
    async fn cliente_inexistente_e_rejeitado() {
        let pool = test_pool().await;
        let quotes = service(&pool);

        let err = quotes.create(payload(42, false)).await.unwrap_err();
        assert!(matches!(err, AppError::ClientNotFound));
    }

    #[tokio::test]
    async fn atualizar_substitui_itens_e_recalcula() {
        let pool = test_pool().await;
        let quotes = service(&pool);
        let client_id = seed_client(&pool).await;

        let created = quotes.create(payload(client_id, false)).await.unwrap();

        let updated = quotes
            .update(
                created.quote.id,
                UpdateQuoteRequest {
                    title: "Instalação elétrica (revisada)".to_string(),
                    client_id,
                    status: QuoteStatus::Approved,
                    valid_until: created.quote.valid_until,
                    notes: None,
                    payment_method: None,
                    payment_terms: None,
                    custom_payment: None,
                    delivery_time: None,
                    include_taxes: false,
                    tax_details: None,
                    items: vec![
                        QuoteItemInput {
                            product_id: 1,
                            quantity: 1.0,
                            unit_price: 50.0,
                            discount: 0.0,
                            description: None,
                        },
                        QuoteItemInput {
                            product_id: 2,
                            quantity: 2.0,
                            unit_price: 25.0,
                            discount: 0.0,
                            description: None,
                        },
                    ],
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.items.len(), 2);
        assert!((updated.quote.total - 100.0).abs() < 1e-9);
        assert_eq!(updated.quote.status, QuoteStatus::Approved);
    }

    #[tokio::test]
    async fn aliquotas_enviadas_no_payload_tem_prioridade() {
        let pool = test_pool().await;
        let quotes = service(&pool);
        let client_id = seed_client(&pool).await;

        let mut request = payload(client_id, true);
        request.tax_details = Some(TaxDetails {
            iss: 2.0,
            pis: 0.0,
            cofins: 0.0,
            others: None,
        });

        let detail = quotes.create(request).await.unwrap();
        assert_eq!(detail.quote.tax_details.iss, 2.0);
        assert!((detail.quote.total - 180.0 * 1.02).abs() < 1e-9);
    }
}
