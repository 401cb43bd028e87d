pub mod auth;
pub use auth::AuthService;
pub mod quote_service;
pub use quote_service::QuoteService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod notification_service;
pub use notification_service::NotificationService;
pub mod export_service;
pub use export_service::ExportService;

pub mod pricing;
