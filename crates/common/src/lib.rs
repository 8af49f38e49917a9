pub mod error;
pub mod logger;
pub mod models;
pub mod traits;
