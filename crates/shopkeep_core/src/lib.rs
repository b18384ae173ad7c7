//! Core persistence logic for the shopkeep product catalog.
//! This crate is the single source of truth for product data invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::product::{
    Category, Product, ProductId, ProductValidationError, MAX_DESCRIPTION_LEN, MAX_NAME_LEN,
};
pub use repo::product_repo::{
    parse_price_token, ProductRepository, RepoError, RepoResult, SqliteProductRepository,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
