pub mod auth;
pub mod client;
pub mod dashboard;
pub mod notification;
pub mod product;
pub mod quote;
pub mod settings;
