//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the one `ReviewService` built at startup plus the request-level
//! settings handlers need. Cloning is cheap: the service is behind an `Arc`.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::db::ReviewStore;
use crate::services::review::ReviewService;

#[derive(Clone)]
pub struct AppState {
    pub reviews: Arc<ReviewService>,
    /// Lowercase header name carrying the gateway-authenticated user id.
    pub auth_user_header: Arc<str>,
    pub max_per_page: Option<u32>,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn ReviewStore>, config: &AppConfig) -> Self {
        Self {
            reviews: Arc::new(ReviewService::new(store)),
            auth_user_header: Arc::from(config.auth_user_header.as_str()),
            max_per_page: config.max_per_page,
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
