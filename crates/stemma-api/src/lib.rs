//! JSON REST API for Stemma.
//!
//! Exposes an axum [`Router`] backed by any
//! [`stemma_core::store::FamilyStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stemma_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod members;
pub mod trees;
pub mod view;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use stemma_core::store::FamilyStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: FamilyStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Trees
    .route("/trees", get(trees::list::<S>).post(trees::create::<S>))
    .route("/trees/{id}", get(trees::get_one::<S>))
    .route("/trees/{id}/members", get(members::list::<S>))
    .route("/trees/{id}/tree", get(view::handler::<S>))
    // Members
    .route("/members", post(members::create::<S>))
    .route(
      "/members/{id}",
      get(members::get_one::<S>)
        .patch(members::update::<S>)
        .delete(members::remove::<S>),
    )
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────
