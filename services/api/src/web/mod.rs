pub mod auth;
pub mod library;
pub mod middleware;
pub mod preferences;
pub mod recommendation;
pub mod rest;
pub mod router;
pub mod state;
pub mod views;

// Re-export the router builder so the binary and the tests share one surface.
pub use router::build_router;
pub use state::AppState;
