// Presentation layer - HTTP surface over patient dashboards
pub mod app_state;
pub mod handlers;
