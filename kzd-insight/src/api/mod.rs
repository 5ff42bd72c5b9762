//! HTTP API handlers

pub mod health;
pub mod history;
pub mod insights;

pub use health::health_routes;
pub use history::history_routes;
pub use insights::insight_routes;
