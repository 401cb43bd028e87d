// src/db/client_repo.rs

use chrono::Utc;
use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    models::client::{Client, CreateClientRequest, UpdateClientRequest},
};

const CLIENT_COLUMNS: &str = "id, name, document, email, phone, address, created_at";

// O repositório de clientes, responsável por todas as interações com a tabela 'clients'
#[derive(Clone)]
pub struct ClientRepository {
    pool: SqlitePool,
}

impl ClientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // Lista com busca opcional por nome, documento ou e-mail.
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Client>, AppError> {
        let sql = format!(
            r#"
            SELECT {CLIENT_COLUMNS}
            FROM clients
            WHERE ?1 IS NULL
               OR name LIKE '%' || ?1 || '%'
               OR document LIKE '%' || ?1 || '%'
               OR email LIKE '%' || ?1 || '%'
            ORDER BY name
            "#
        );
        let clients = sqlx::query_as::<_, Client>(&sql)
            .bind(search)
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Client>, AppError> {
        let sql = format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1");
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    pub async fn create(&self, input: CreateClientRequest) -> Result<Client, AppError> {
        let sql = format!(
            r#"
            INSERT INTO clients (name, document, email, phone, address, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(input.name)
            .bind(input.document)
            .bind(input.email)
            .bind(input.phone)
            .bind(input.address)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;
        Ok(client)
    }

    // created_at nunca é alterado depois da criação.
    pub async fn update(&self, id: i64, input: UpdateClientRequest) -> Result<Client, AppError> {
        let sql = format!(
            r#"
            UPDATE clients
            SET name = ?2, document = ?3, email = ?4, phone = ?5, address = ?6
            WHERE id = ?1
            RETURNING {CLIENT_COLUMNS}
            "#
        );
        let client = sqlx::query_as::<_, Client>(&sql)
            .bind(id)
            .bind(input.name)
            .bind(input.document)
            .bind(input.email)
            .bind(input.phone)
            .bind(input.address)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::ClientNotFound)?;
        Ok(client)
    }

    // A exclusão é recusada enquanto houver orçamentos apontando para o
    // cliente. A integridade é garantida aqui, no limite do armazenamento.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        let references: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM quotes WHERE client_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if references > 0 {
            return Err(AppError::ClientInUse);
        }

        let result = sqlx::query("DELETE FROM clients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ClientNotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;

    fn novo_cliente(name: &str) -> CreateClientRequest {
        CreateClientRequest {
            name: name.to_string(),
            document: Some("123.456.789-00".to_string()),
            email: Some("cliente@exemplo.com.br".to_string()),
            phone: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn cria_e_busca_cliente() {
        let repo = ClientRepository::new(test_pool().await);

        let created = repo.create(novo_cliente("Acme")).await.unwrap();
        assert_eq!(created.name, "Acme");

        let found = repo.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.document.as_deref(), Some("123.456.789-00"));
    }

    #[tokio::test]
    async fn ids_sao_sequenciais() {
        let repo = ClientRepository::new(test_pool().await);

        let first = repo.create(novo_cliente("Primeiro")).await.unwrap();
        let second = repo.create(novo_cliente("Segundo")).await.unwrap();
        assert_eq!(second.id, first.id + 1);
    }

    #[tokio::test]
    async fn busca_filtra_por_nome_documento_ou_email() {
        let repo = ClientRepository::new(test_pool().await);
        repo.create(novo_cliente("Construtora Silva")).await.unwrap();
        repo.create(CreateClientRequest {
            name: "João Pereira".to_string(),
            document: Some("987.654.321-00".to_string()),
            email: Some("joao@pereira.com.br".to_string()),
            phone: None,
            address: None,
        })
        .await
        .unwrap();

        let by_name = repo.list(Some("Silva")).await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].name, "Construtora Silva");

        let by_document = repo.list(Some("987.654")).await.unwrap();
        assert_eq!(by_document.len(), 1);
        assert_eq!(by_document[0].name, "João Pereira");

        let all = repo.list(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn atualiza_sem_tocar_na_data_de_criacao() {
        let repo = ClientRepository::new(test_pool().await);
        let created = repo.create(novo_cliente("Antes")).await.unwrap();

        let updated = repo
            .update(
                created.id,
                UpdateClientRequest {
                    name: "Depois".to_string(),
                    document: None,
                    email: None,
                    phone: None,
                    address: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Depois");
        assert_eq!(updated.document, None);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn excluir_cliente_inexistente_da_erro() {
        let repo = ClientRepository::new(test_pool().await);
        let err = repo.delete(99).await.unwrap_err();
        assert!(matches!(err, AppError::ClientNotFound));
    }
}
