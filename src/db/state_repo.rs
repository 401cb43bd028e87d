// src/db/state_repo.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::common::error::AppError;

// Guarda documentos JSON por chave (notificações ativas, ids já vistos).
// Equivale ao armazenamento chave/valor que o aplicativo usa no navegador.
#[derive(Clone)]
pub struct StateRepository {
    pool: SqlitePool,
}

impl StateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM app_state WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn put(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO app_state (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    #[tokio::test]
    async fn grava_le_e_sobrescreve() {
        let pool = test_pool().await;
        let repo = StateRepository::new(pool);

        assert!(repo.get("ausente").await.unwrap().is_none());

        repo.put("orcafacil_viewed_notifications", "[]").await.unwrap();
        assert_eq!(
            repo.get("orcafacil_viewed_notifications").await.unwrap().as_deref(),
            Some("[]")
        );

        repo.put("orcafacil_viewed_notifications", r#"["expiring_1"]"#)
            .await
            .unwrap();
        assert_eq!(
            repo.get("orcafacil_viewed_notifications").await.unwrap().as_deref(),
            Some(r#"["expiring_1"]"#)
        );
    }
}
