pub mod analyzer;
pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod fetcher;
pub mod metrics;
pub mod preview;

use std::sync::Arc;
use analyzer::Analyzer;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    pub fn new(analyzer: Analyzer) -> Self {
        Self {
            analyzer: Arc::new(analyzer),
        }
    }
}
