//! JSON REST API for the PDI people service.
//!
//! Exposes an axum [`Router`] backed by any [`pdi_core::store::PeopleStore`].
//! Every request is made on behalf of an actor named by the `x-actor-id`
//! header, which an authenticating gateway in front of this service is
//! expected to set. Every read goes through the visibility policy and the
//! masking layer; every write is checked against the policy first.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", pdi_api::api_router(AppState::new(store, mode)))
//! ```

pub mod actors;
pub mod entities;
pub mod error;
pub mod guard;
pub mod mode;
pub mod session;
pub mod teams;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use pdi_core::{mode::ModeController, store::PeopleStore};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use session::{CurrentActor, KnownActors};

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store:        Arc<S>,
  /// The same controller the store wrapper reports failures to.
  pub mode:         Arc<ModeController>,
  /// Sessions resolved while live, used once the store degrades.
  pub known_actors: Arc<KnownActors>,
}

impl<S> AppState<S> {
  pub fn new(store: Arc<S>, mode: Arc<ModeController>) -> Self {
    Self { store, mode, known_actors: Arc::default() }
  }
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:        self.store.clone(),
      mode:         self.mode.clone(),
      known_actors: self.known_actors.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: PeopleStore + 'static,
{
  Router::new()
    .route("/me", get(actors::me::<S>))
    // Actors
    .route("/actors", get(actors::list::<S>).post(actors::create::<S>))
    .route("/actors/{id}", get(actors::get_one::<S>).patch(actors::update::<S>))
    // Owned entities
    .route("/entities", get(entities::list::<S>).post(entities::create::<S>))
    .route(
      "/entities/{id}",
      get(entities::get_one::<S>)
        .patch(entities::update::<S>)
        .delete(entities::delete_one::<S>),
    )
    .route("/entities/{id}/evaluate", post(entities::evaluate_one::<S>))
    // Teams
    .route("/teams", get(teams::list::<S>).post(teams::create::<S>))
    .route(
      "/teams/{id}/members/{actor_id}",
      put(teams::add_member::<S>).delete(teams::remove_member::<S>),
    )
    // Data-source mode
    .route("/mode", get(mode::get::<S>).put(mode::set::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
