//! PostgreSQL connectivity for the workflow store.

pub mod connection;
pub mod error_codes;

pub use connection::DatabaseConnection;
pub use error_codes::PgErrorCode;
