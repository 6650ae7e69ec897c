/// Connection pool setup and migrations
pub mod connection;
/// Table models and their queries
pub mod models;
