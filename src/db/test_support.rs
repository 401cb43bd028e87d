// src/db/test_support.rs

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

// Banco em memória com o esquema aplicado. Conexão única mantida viva para
// o banco não desaparecer entre as consultas.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("falha ao abrir o banco em memória");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("falha ao aplicar as migrações");

    pool
}
