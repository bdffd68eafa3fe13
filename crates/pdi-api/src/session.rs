//! Resolves the acting user for a request.
//!
//! Actors found while the live source answers are remembered in
//! [`KnownActors`]. Once the service degrades, the store serves sample data
//! that does not know the live users, so sessions are resolved from that
//! cache first. Actors never seen while live cannot sign in until the mode is
//! restored.

use std::collections::HashMap;

use axum::{extract::FromRequestParts, http::request::Parts};
use pdi_core::{actor::Actor, store::PeopleStore};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// Header carrying the authenticated actor's id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The active actor making the request.
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

/// Last known state of every actor resolved from the live source.
#[derive(Debug, Default)]
pub struct KnownActors {
  actors: RwLock<HashMap<Uuid, Actor>>,
}

impl KnownActors {
  pub async fn get(&self, id: Uuid) -> Option<Actor> {
    self.actors.read().await.get(&id).cloned()
  }

  async fn remember(&self, actor: &Actor) {
    self.actors.write().await.insert(actor.actor_id, actor.clone());
  }

  async fn forget(&self, id: Uuid) { self.actors.write().await.remove(&id); }
}

async fn resolve<S: PeopleStore>(
  state: &AppState<S>,
  actor_id: Uuid,
) -> Result<Option<Actor>, ApiError> {
  if state.mode.is_degraded()
    && let Some(actor) = state.known_actors.get(actor_id).await
  {
    return Ok(Some(actor));
  }

  let was_live = !state.mode.is_degraded();
  let found = state.store.get_actor(actor_id).await.map_err(ApiError::store)?;

  if !state.mode.is_degraded() {
    if was_live {
      match &found {
        Some(actor) => state.known_actors.remember(actor).await,
        None => state.known_actors.forget(actor_id).await,
      }
    }
    return Ok(found);
  }
  // The lookup itself may have degraded the store.
  match found {
    Some(actor) => Ok(Some(actor)),
    None => Ok(state.known_actors.get(actor_id).await),
  }
}

impl<S> FromRequestParts<AppState<S>> for CurrentActor
where
  S: PeopleStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let actor_id = parts
      .headers
      .get(ACTOR_HEADER)
      .and_then(|v| v.to_str().ok())
      .ok_or_else(|| ApiError::Unauthorized(format!("missing {ACTOR_HEADER} header")))?;
    let actor_id = Uuid::parse_str(actor_id.trim())
      .map_err(|_| ApiError::Unauthorized(format!("malformed {ACTOR_HEADER} header")))?;

    let actor = resolve(state, actor_id)
      .await?
      .ok_or_else(|| ApiError::Unauthorized(format!("unknown actor {actor_id}")))?;

    if !actor.is_active() {
      tracing::debug!(%actor_id, "rejecting inactive actor");
      return Err(ApiError::Inactive);
    }
    Ok(CurrentActor(actor))
  }
}
