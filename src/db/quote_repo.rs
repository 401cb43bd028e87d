// src/db/quote_repo.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::{
        client::Client,
        product::Product,
        quote::{
            Quote, QuoteDetail, QuoteItem, QuoteItemDetail, QuoteStatus, QuoteWithClient,
            TaxDetails,
        },
    },
};

const QUOTE_COLUMNS: &str = "id, title, client_id, status, total, valid_until, notes, \
     payment_method, payment_terms, custom_payment, delivery_time, include_taxes, \
     iss, pis, cofins, others, created_at";

const ITEM_COLUMNS: &str =
    "id, quote_id, product_id, description, quantity, unit_price, discount, subtotal";

// Cabeçalho pronto para gravação, com o total já recalculado pelo serviço.
#[derive(Debug)]
pub struct QuoteRecord {
    pub title: String,
    pub client_id: i64,
    pub status: QuoteStatus,
    pub total: f64,
    pub valid_until: DateTime<Utc>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub payment_terms: Option<String>,
    pub custom_payment: Option<String>,
    pub delivery_time: Option<String>,
    pub include_taxes: bool,
    pub tax_details: TaxDetails,
}

#[derive(Debug)]
pub struct QuoteItemRecord {
    pub product_id: i64,
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub discount: f64,
    pub subtotal: f64,
}

#[derive(Clone)]
pub struct QuoteRepository {
    pool: SqlitePool,
}

impl QuoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_all(&self) -> Result<Vec<Quote>, AppError> {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes ORDER BY id");
        let quotes = sqlx::query_as::<_, Quote>(&sql).fetch_all(&self.pool).await?;
        Ok(quotes)
    }

    pub async fn list_all_items(&self) -> Result<Vec<QuoteItem>, AppError> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM quote_items ORDER BY id");
        let items = sqlx::query_as::<_, QuoteItem>(&sql).fetch_all(&self.pool).await?;
        Ok(items)
    }

    // Listagem com filtros opcionais e o cliente resolvido em memória.
    pub async fn list(
        &self,
        status: Option<QuoteStatus>,
        client_id: Option<i64>,
        search: Option<&str>,
    ) -> Result<Vec<QuoteWithClient>, AppError> {
        let sql = format!(
            r#"
            SELECT {QUOTE_COLUMNS}
            FROM quotes
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR client_id = ?2)
              AND (?3 IS NULL OR title LIKE '%' || ?3 || '%')
            ORDER BY created_at DESC
            "#
        );
        let quotes = sqlx::query_as::<_, Quote>(&sql)
            .bind(status)
            .bind(client_id)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;

        let clients = self.client_map().await?;
        Ok(quotes
            .into_iter()
            .map(|quote| {
                let client = clients.get(&quote.client_id).cloned();
                QuoteWithClient { quote, client }
            })
            .collect())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Quote>, AppError> {
        let sql = format!("SELECT {QUOTE_COLUMNS} FROM quotes WHERE id = ?1");
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(quote)
    }

    // Orçamento completo: cabeçalho, cliente e itens com produtos resolvidos.
    pub async fn get_detail(&self, id: i64) -> Result<QuoteDetail, AppError> {
        let quote = self.find_by_id(id).await?.ok_or(AppError::QuoteNotFound)?;

        let client = sqlx::query_as::<_, Client>(
            "SELECT id, name, document, email, phone, address, created_at FROM clients WHERE id = ?1",
        )
        .bind(quote.client_id)
        .fetch_optional(&self.pool)
        .await?;

        let items_sql =
            format!("SELECT {ITEM_COLUMNS} FROM quote_items WHERE quote_id = ?1 ORDER BY id");
        let items = sqlx::query_as::<_, QuoteItem>(&items_sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        let products = self.product_map().await?;
        let items = items
            .into_iter()
            .map(|item| {
                let product = products.get(&item.product_id).cloned();
                QuoteItemDetail { item, product }
            })
            .collect();

        Ok(QuoteDetail { quote, client, items })
    }

    pub async fn create_with_items(
        &self,
        quote: QuoteRecord,
        items: Vec<QuoteItemRecord>,
    ) -> Result<i64, AppError> {
        let mut tx = self.pool.begin().await?;

        let quote_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO quotes (title, client_id, status, total, valid_until, notes,
                                payment_method, payment_terms, custom_payment, delivery_time,
                                include_taxes, iss, pis, cofins, others, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)
            RETURNING id
            "#,
        )
        .bind(quote.title)
        .bind(quote.client_id)
        .bind(quote.status)
        .bind(quote.total)
        .bind(quote.valid_until)
        .bind(quote.notes)
        .bind(quote.payment_method)
        .bind(quote.payment_terms)
        .bind(quote.custom_payment)
        .bind(quote.delivery_time)
        .bind(quote.include_taxes)
        .bind(quote.tax_details.iss)
        .bind(quote.tax_details.pis)
        .bind(quote.tax_details.cofins)
        .bind(quote.tax_details.others)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_items(&mut tx, quote_id, &items).await?;

        tx.commit().await?;
        Ok(quote_id)
    }

    // A edição substitui os itens em bloco e preserva a data de criação.
    pub async fn update_with_items(
        &self,
        id: i64,
        quote: QuoteRecord,
        items: Vec<QuoteItemRecord>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotes
            SET title = ?2, client_id = ?3, status = ?4, total = ?5, valid_until = ?6,
                notes = ?7, payment_method = ?8, payment_terms = ?9, custom_payment = ?10,
                delivery_time = ?11, include_taxes = ?12, iss = ?13, pis = ?14, cofins = ?15,
                others = ?16
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(quote.title)
        .bind(quote.client_id)
        .bind(quote.status)
        .bind(quote.total)
        .bind(quote.valid_until)
        .bind(quote.notes)
        .bind(quote.payment_method)
        .bind(quote.payment_terms)
        .bind(quote.custom_payment)
        .bind(quote.delivery_time)
        .bind(quote.include_taxes)
        .bind(quote.tax_details.iss)
        .bind(quote.tax_details.pis)
        .bind(quote.tax_details.cofins)
        .bind(quote.tax_details.others)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::QuoteNotFound);
        }

        sqlx::query("DELETE FROM quote_items WHERE quote_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::insert_items(&mut tx, id, &items).await?;

        tx.commit().await?;
        Ok(())
    }

    // Os itens caem junto pela FK com ON DELETE CASCADE.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM quotes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::QuoteNotFound);
        }
        Ok(())
    }

    async fn insert_items(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        quote_id: i64,
        items: &[QuoteItemRecord],
    ) -> Result<(), AppError> {
        for item in items {
            sqlx::query(
                r#"
                INSERT INTO quote_items (quote_id, product_id, description, quantity,
                                         unit_price, discount, subtotal)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(quote_id)
            .bind(item.product_id)
            .bind(item.description.clone())
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(item.discount)
            .bind(item.subtotal)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn client_map(&self) -> Result<HashMap<i64, Client>, AppError> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT id, name, document, email, phone, address, created_at FROM clients",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(clients.into_iter().map(|c| (c.id, c)).collect())
    }

    async fn product_map(&self) -> Result<HashMap<i64, Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT id, name, description, price, kind, unit, internal_code, created_at FROM products",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::db::ClientRepository;
    use crate::models::client::CreateClientRequest;
    use chrono::Duration;

    async fn seed_client(pool: &SqlitePool, name: &str) -> i64 {
        ClientRepository::new(pool.clone())
            .create(CreateClientRequest {
                name: name.to_string(),
                document: None,
                email: None,
                phone: None,
                address: None,
            })
            .await
            .unwrap()
            .id
    }

    fn record(client_id: i64, title: &str, status: QuoteStatus, total: f64) -> QuoteRecord {
        QuoteRecord {
            title: title.to_string(),
            client_id,
            status,
            total,
            valid_until: Utc::now() + Duration::days(30),
            notes: None,
            payment_method: Some("pix".to_string()),
            payment_terms: None,
            custom_payment: None,
            delivery_time: Some("15 dias".to_string()),
            include_taxes: false,
            tax_details: TaxDetails::default(),
        }
    }

    fn item(product_id: i64, quantity: f64, unit_price: f64, discount: f64) -> QuoteItemRecord {
        QuoteItemRecord {
            product_id,
            description: None,
            quantity,
            unit_price,
            discount,
            subtotal: quantity * unit_price * (1.0 - discount / 100.0),
        }
    }

    #[tokio::test]
    async fn salva_e_rele_orcamento_com_itens() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let client_id = seed_client(&pool, "Acme").await;

        let quote_id = repo
            .create_with_items(
                record(client_id, "Reforma do escritório", QuoteStatus::Pending, 380.0),
                vec![item(1, 2.0, 100.0, 10.0), item(2, 4.0, 50.0, 0.0)],
            )
            .await
            .unwrap();

        let detail = repo.get_detail(quote_id).await.unwrap();
        assert_eq!(detail.quote.title, "Reforma do escritório");
        assert_eq!(detail.client.as_ref().map(|c| c.name.as_str()), Some("Acme"));
        assert_eq!(detail.items.len(), 2);
        assert_eq!(detail.items[0].item.quantity, 2.0);
        assert_eq!(detail.items[0].item.subtotal, 180.0);
        assert_eq!(detail.items[1].item.unit_price, 50.0);
    }

    #[tokio::test]
    async fn edicao_substitui_itens_em_bloco_e_preserva_criacao() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let client_id = seed_client(&pool, "Acme").await;

        let quote_id = repo
            .create_with_items(
                record(client_id, "Original", QuoteStatus::Draft, 100.0),
                vec![item(1, 1.0, 100.0, 0.0)],
            )
            .await
            .unwrap();
        let before = repo.find_by_id(quote_id).await.unwrap().unwrap();

        repo.update_with_items(
            quote_id,
            record(client_id, "Revisado", QuoteStatus::Pending, 90.0),
            vec![item(2, 3.0, 30.0, 0.0)],
        )
        .await
        .unwrap();

        let after = repo.get_detail(quote_id).await.unwrap();
        assert_eq!(after.quote.title, "Revisado");
        assert_eq!(after.quote.status, QuoteStatus::Pending);
        assert_eq!(after.quote.created_at, before.created_at);
        assert_eq!(after.items.len(), 1);
        assert_eq!(after.items[0].item.product_id, 2);
    }

    #[tokio::test]
    async fn excluir_orcamento_remove_os_itens() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let client_id = seed_client(&pool, "Acme").await;

        let quote_id = repo
            .create_with_items(
                record(client_id, "Descartável", QuoteStatus::Draft, 50.0),
                vec![item(1, 1.0, 50.0, 0.0)],
            )
            .await
            .unwrap();

        repo.delete(quote_id).await.unwrap();

        assert!(repo.find_by_id(quote_id).await.unwrap().is_none());
        assert!(repo.list_all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cliente_com_orcamentos_nao_pode_ser_excluido() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let clients = ClientRepository::new(pool.clone());
        let client_id = seed_client(&pool, "Vinculado").await;

        repo.create_with_items(record(client_id, "Ativo", QuoteStatus::Pending, 10.0), vec![])
            .await
            .unwrap();

        let err = clients.delete(client_id).await.unwrap_err();
        assert!(matches!(err, AppError::ClientInUse));
    }

    #[tokio::test]
    async fn listagem_filtra_por_status_cliente_e_titulo() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let acme = seed_client(&pool, "Acme").await;
        let beta = seed_client(&pool, "Beta").await;

        repo.create_with_items(record(acme, "Pintura externa", QuoteStatus::Approved, 1.0), vec![])
            .await
            .unwrap();
        repo.create_with_items(record(acme, "Elétrica", QuoteStatus::Draft, 2.0), vec![])
            .await
            .unwrap();
        repo.create_with_items(record(beta, "Pintura interna", QuoteStatus::Approved, 3.0), vec![])
            .await
            .unwrap();

        let approved = repo.list(Some(QuoteStatus::Approved), None, None).await.unwrap();
        assert_eq!(approved.len(), 2);

        let of_acme = repo.list(None, Some(acme), None).await.unwrap();
        assert_eq!(of_acme.len(), 2);
        assert!(of_acme.iter().all(|q| q.quote.client_id == acme));
        assert_eq!(of_acme[0].client.as_ref().map(|c| c.name.as_str()), Some("Acme"));

        let by_title = repo.list(None, None, Some("Pintura")).await.unwrap();
        assert_eq!(by_title.len(), 2);

        let combined = repo
            .list(Some(QuoteStatus::Approved), Some(beta), Some("Pintura"))
            .await
            .unwrap();
        assert_eq!(combined.len(), 1);
        assert_eq!(combined[0].quote.title, "Pintura interna");
    }

    #[tokio::test]
    async fn item_de_produto_removido_fica_sem_produto_resolvido() {
        let pool = test_pool().await;
        let repo = QuoteRepository::new(pool.clone());
        let client_id = seed_client(&pool, "Acme").await;

        // product_id 99 nunca existiu no catálogo
        let quote_id = repo
            .create_with_items(
                record(client_id, "Com item órfão", QuoteStatus::Pending, 100.0),
                vec![item(99, 1.0, 100.0, 0.0)],
            )
            .await
            .unwrap();

        let detail = repo.get_detail(quote_id).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert!(detail.items[0].product.is_none());
    }
}
