// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::logout,
        handlers::auth::get_me,

        // --- Clientes ---
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::create_client,
        handlers::clients::update_client,
        handlers::clients::delete_client,

        // --- Produtos ---
        handlers::products::list_products,
        handlers::products::get_product,
        handlers::products::create_product,
        handlers::products::update_product,
        handlers::products::delete_product,

        // --- Orçamentos ---
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::create_quote,
        handlers::quotes::update_quote,
        handlers::quotes::delete_quote,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,

        // --- Dashboard ---
        handlers::dashboard::get_stats,

        // --- Notificações ---
        handlers::notifications::list_notifications,
        handlers::notifications::create_notification,
        handlers::notifications::mark_notification_read,
        handlers::notifications::mark_notification_viewed,
        handlers::notifications::delete_notification,
        handlers::notifications::clear_notifications,

        // --- Exportações ---
        handlers::exports::quotes_report_pdf,
        handlers::exports::quotes_report_xlsx,
        handlers::exports::quote_document_pdf,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,

            // --- Clientes ---
            models::client::Client,
            models::client::CreateClientRequest,
            models::client::UpdateClientRequest,

            // --- Produtos ---
            models::product::ProductKind,
            models::product::Product,
            models::product::CreateProductRequest,
            models::product::UpdateProductRequest,

            // --- Orçamentos ---
            models::quote::QuoteStatus,
            models::quote::TaxDetails,
            models::quote::Quote,
            models::quote::QuoteItem,
            models::quote::QuoteWithClient,
            models::quote::QuoteItemDetail,
            models::quote::QuoteDetail,
            models::quote::QuoteItemInput,
            models::quote::CreateQuoteRequest,
            models::quote::UpdateQuoteRequest,

            // --- Configurações ---
            models::settings::CompanySettings,
            models::settings::UpdateSettingsRequest,

            // --- Dashboard ---
            models::dashboard::DashboardStats,
            models::dashboard::TopClient,
            models::dashboard::TopProduct,
            models::dashboard::ProductMonthlyQuantities,
            models::dashboard::ProductQuantity,
            models::dashboard::MonthlyQuoteCounts,

            // --- Notificações ---
            models::notification::NotificationKind,
            models::notification::Notification,
            models::notification::CreateNotificationRequest,
        )
    ),
    tags(
        (name = "Autenticação", description = "Registro, login e sessão"),
        (name = "Clientes", description = "Cadastro de clientes"),
        (name = "Produtos", description = "Catálogo de produtos e serviços"),
        (name = "Orçamentos", description = "Criação, edição e cálculo de orçamentos"),
        (name = "Configurações", description = "Dados da empresa e alíquotas padrão"),
        (name = "Dashboard", description = "Indicadores e gráficos gerenciais"),
        (name = "Notificações", description = "Alertas de vencimento e aprovação"),
        (name = "Exportações", description = "Relatórios em PDF e planilha")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
