pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod exports;
pub mod notifications;
pub mod products;
pub mod quotes;
pub mod settings;
