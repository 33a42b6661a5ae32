pub mod actions;
pub mod analytics;
pub mod api_router;
pub mod core;
pub mod dashboard;
pub mod owners;
pub mod properties;
