//! Login-protected dashboard pages over the shared TimescaleDB repositories.

use axum::routing::{get, post, put};
use axum::Router;
use std::sync::Arc;

pub mod auth;
pub mod client_ip;
pub mod error;
pub mod pages;
pub mod password;
pub mod session;
pub mod state;
pub mod tasks;
pub mod templates;
pub mod throttle;
pub mod widgets;

pub use state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(pages::dashboard))
        .route("/login", get(pages::login_page).post(pages::login_submit))
        .route("/logout", post(pages::logout))
        .route("/performance", get(pages::performance))
        .route("/api/widgets", get(widgets::list))
        .route("/api/widgets/:name", put(widgets::upsert).delete(widgets::remove))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
}
