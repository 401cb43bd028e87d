// src/db/settings_repo.rs

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::settings::{CompanySettings, UpdateSettingsRequest},
};

const SETTINGS_COLUMNS: &str =
    "id, name, document, email, phone, address, logo, currency, iss, pis, cofins, others";

#[derive(Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Registro único: a primeira leitura semeia os padrões brasileiros
    // (ISS 3%, PIS 0,65%, COFINS 3%).
    pub async fn get_or_create(&self) -> Result<CompanySettings, AppError> {
        let sql = format!("SELECT {SETTINGS_COLUMNS} FROM company_settings ORDER BY id LIMIT 1");
        if let Some(settings) = sqlx::query_as::<_, CompanySettings>(&sql)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(settings);
        }

        let insert =
            format!("INSERT INTO company_settings (name) VALUES (?1) RETURNING {SETTINGS_COLUMNS}");
        let settings = sqlx::query_as::<_, CompanySettings>(&insert)
            .bind("Minha Empresa")
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }

    // Substituição integral: campos omitidos voltam a ficar vazios.
    pub async fn update(&self, payload: UpdateSettingsRequest) -> Result<CompanySettings, AppError> {
        let current = self.get_or_create().await?;

        let sql = format!(
            r#"
            UPDATE company_settings
            SET name = ?2, document = ?3, email = ?4, phone = ?5, address = ?6,
                logo = ?7, currency = ?8, iss = ?9, pis = ?10, cofins = ?11, others = ?12
            WHERE id = ?1
            RETURNING {SETTINGS_COLUMNS}
            "#
        );
        let settings = sqlx::query_as::<_, CompanySettings>(&sql)
            .bind(current.id)
            .bind(payload.name)
            .bind(payload.document)
            .bind(payload.email)
            .bind(payload.phone)
            .bind(payload.address)
            .bind(payload.logo)
            .bind(payload.currency)
            .bind(payload.default_tax_settings.iss)
            .bind(payload.default_tax_settings.pis)
            .bind(payload.default_tax_settings.cofins)
            .bind(payload.default_tax_settings.others)
            .fetch_one(&self.pool)
            .await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::models::quote::TaxDetails;

    #[tokio::test]
    async fn primeira_leitura_semeia_os_padroes() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(pool);

        let settings = repo.get_or_create().await.unwrap();
        assert_eq!(settings.name, "Minha Empresa");
        assert_eq!(settings.currency, "BRL");
        assert_eq!(settings.default_tax_settings.iss, 3.0);
        assert_eq!(settings.default_tax_settings.pis, 0.65);
        assert_eq!(settings.default_tax_settings.cofins, 3.0);
    }

    #[tokio::test]
    async fn leituras_seguintes_nao_duplicam_o_registro() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(pool);

        let first = repo.get_or_create().await.unwrap();
        let second = repo.get_or_create().await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn atualizacao_substitui_todos_os_campos() {
        let pool = test_pool().await;
        let repo = SettingsRepository::new(pool);
        repo.get_or_create().await.unwrap();

        let updated = repo
            .update(UpdateSettingsRequest {
                name: "Oficina do Zé".to_string(),
                document: Some("12.345.678/0001-90".to_string()),
                email: Some("contato@oficina.com.br".to_string()),
                phone: None,
                address: Some("Rua das Flores, 10".to_string()),
                logo: None,
                currency: "BRL".to_string(),
                default_tax_settings: TaxDetails {
                    iss: 5.0,
                    pis: 1.65,
                    cofins: 7.6,
                    others: Some("IRPJ 1,5%".to_string()),
                },
            })
            .await
            .unwrap();

        assert_eq!(updated.name, "Oficina do Zé");
        assert_eq!(updated.default_tax_settings.iss, 5.0);
        assert_eq!(updated.default_tax_settings.others.as_deref(), Some("IRPJ 1,5%"));
        assert!(updated.phone.is_none());

        // a substituição integral limpa o que não veio no payload
        let reread = repo.get_or_create().await.unwrap();
        assert!(reread.logo.is_none());
        assert_eq!(reread.default_tax_settings.cofins, 7.6);
    }
}
