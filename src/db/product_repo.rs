// src/db/product_repo.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::product::{CreateProductRequest, Product, ProductKind, UpdateProductRequest},
};

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, kind, unit, internal_code, created_at";

#[derive(Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Lista com busca por nome/descrição e filtro opcional por tipo.
    pub async fn list(
        &self,
        search: Option<&str>,
        kind: Option<ProductKind>,
    ) -> Result<Vec<Product>, AppError> {
        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE (?1 IS NULL
                   OR name LIKE '%' || ?1 || '%'
                   OR description LIKE '%' || ?1 || '%')
              AND (?2 IS NULL OR kind = ?2)
            ORDER BY name
            "#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(search)
            .bind(kind)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Product>, AppError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn create(&self, input: CreateProductRequest) -> Result<Product, AppError> {
        let sql = format!(
            r#"
            INSERT INTO products (name, description, price, kind, unit, internal_code, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(input.name)
            .bind(input.description)
            .bind(input.price)
            .bind(input.kind)
            .bind(input.unit)
            .bind(input.internal_code)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(product)
    }

    pub async fn update(&self, id: i64, input: UpdateProductRequest) -> Result<Product, AppError> {
        let sql = format!(
            r#"
            UPDATE products
            SET name = ?2, description = ?3, price = ?4, kind = ?5, unit = ?6, internal_code = ?7
            WHERE id = ?1
            RETURNING {PRODUCT_COLUMNS}
            "#
        );
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(input.name)
            .bind(input.description)
            .bind(input.price)
            .bind(input.kind)
            .bind(input.unit)
            .bind(input.internal_code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        Ok(product)
    }

    // Itens de orçamento guardam preço e descrição próprios, então a exclusão
    // é livre. Leitores de itens órfãos exibem "Produto desconhecido".
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ProductNotFound);
        }
        Ok(())
    }
}
