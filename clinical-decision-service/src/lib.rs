pub mod backends;
pub mod config;
pub mod extractor;
pub mod models;
pub mod service;

pub use config::ServiceConfig;
pub use extractor::PatternNameExtractor;
pub use models::*;
pub use service::{AppState, build_router, create_app, create_app_state};
