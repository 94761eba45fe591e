//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;
pub mod payment;
pub mod storage;

pub use database::{connect_and_migrate, init_database, DatabaseConfig};
pub use payment::{HttpPaymentGateway, PaymentGatewayConfig};
pub use storage::InMemoryRepositoryProvider;
