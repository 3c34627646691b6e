//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use shelfmate_core::ports::{DatabaseService, RecommendationService};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
///
/// Construct it only after storage is open and the genre catalog is seeded.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub recommender: Arc<dyn RecommendationService>,
}
