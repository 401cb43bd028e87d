//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_middleware;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    // Todo o restante da API exige sessão válida
    let api_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .route(
            "/clients",
            get(handlers::clients::list_clients).post(handlers::clients::create_client),
        )
        .route(
            "/clients/{id}",
            get(handlers::clients::get_client)
                .put(handlers::clients::update_client)
                .delete(handlers::clients::delete_client),
        )
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/quotes",
            get(handlers::quotes::list_quotes).post(handlers::quotes::create_quote),
        )
        .route(
            "/quotes/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/quotes/{id}/pdf", get(handlers::exports::quote_document_pdf))
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route("/dashboard/stats", get(handlers::dashboard::get_stats))
        .route(
            "/notifications",
            get(handlers::notifications::list_notifications)
                .post(handlers::notifications::create_notification)
                .delete(handlers::notifications::clear_notifications),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notifications::delete_notification),
        )
        .route(
            "/notifications/{id}/read",
            patch(handlers::notifications::mark_notification_read),
        )
        .route(
            "/notifications/{id}/viewed",
            post(handlers::notifications::mark_notification_viewed),
        )
        .route(
            "/exports/quotes/pdf",
            get(handlers::exports::quotes_report_pdf),
        )
        .route(
            "/exports/quotes/xlsx",
            get(handlers::exports::quotes_report_xlsx),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // A interface (SPA) é servida da pasta estática; qualquer rota que não
    // seja da API cai no index.html e o roteamento segue no navegador.
    let spa = ServeDir::new(&app_state.static_dir).fallback(ServeFile::new(format!(
        "{}/index.html",
        app_state.static_dir
    )));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .fallback_service(spa)
        .with_state(app_state.clone());

    // Varredura periódica de alertas em segundo plano. O emissor fica vivo
    // até o fim do processo; derrubá-lo encerra a varredura.
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    app_state.notification_service.clone().spawn_poller(shutdown_rx);

    // Inicia o servidor
    let addr = format!("0.0.0.0:{}", app_state.port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
