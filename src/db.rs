pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod state_repo;
pub use state_repo::StateRepository;
pub mod user_repo;
pub use user_repo::UserRepository;

#[cfg(test)]
pub mod test_support;
