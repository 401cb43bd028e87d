// src/config.rs

use std::{env, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::{
    db::{
        ClientRepository, ProductRepository, QuoteRepository, SettingsRepository,
        StateRepository, UserRepository,
    },
    services::{AuthService, DashboardService, ExportService, NotificationService, QuoteService},
};

#[derive(Clone)]
pub struct AppState {
    pub port: u16,
    pub static_dir: String,
    pub auth_service: AuthService,
    pub client_repo: ClientRepository,
    pub product_repo: ProductRepository,
    pub settings_repo: SettingsRepository,
    pub quote_service: QuoteService,
    pub dashboard_service: DashboardService,
    pub notification_service: NotificationService,
    pub export_service: ExportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://orcafacil.db".to_string());
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3000);
        let static_dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./public".to_string());
        let fonts_dir = env::var("FONTS_DIR").unwrap_or_else(|_| "./fonts".to_string());

        let connect_options = SqliteConnectOptions::from_str(&database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let db_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(connect_options)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // As migrações precisam rodar antes dos serviços: o cache de
        // notificações lê o estado persistido já na inicialização.
        sqlx::migrate!().run(&db_pool).await?;
        tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let client_repo = ClientRepository::new(db_pool.clone());
        let product_repo = ProductRepository::new(db_pool.clone());
        let quote_repo = QuoteRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let state_repo = StateRepository::new(db_pool);

        let auth_service = AuthService::new(user_repo, jwt_secret);
        let quote_service = QuoteService::new(
            quote_repo.clone(),
            client_repo.clone(),
            settings_repo.clone(),
        );
        let dashboard_service = DashboardService::new(
            quote_repo.clone(),
            client_repo.clone(),
            product_repo.clone(),
        );
        let notification_service =
            NotificationService::load(quote_repo.clone(), state_repo).await?;
        let export_service = ExportService::new(quote_repo, settings_repo.clone(), fonts_dir);

        Ok(Self {
            port,
            static_dir,
            auth_service,
            client_repo,
            product_repo,
            settings_repo,
            quote_service,
            dashboard_service,
            notification_service,
            export_service,
        })
    }
}
