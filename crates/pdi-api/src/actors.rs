//! Handlers for `/me` and `/actors` endpoints.
//!
//! | Method  | Path | Notes |
//! |---------|------|-------|
//! | `GET`   | `/me` | The current actor |
//! | `GET`   | `/actors` | Profiles the current actor may read |
//! | `GET`   | `/actors/:id` | 404 if absent or not readable |
//! | `POST`  | `/actors` | Body: [`NewActor`]; admin only; returns 201 |
//! | `PATCH` | `/actors/:id` | Body: [`ActorPatch`]; admin only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pdi_core::{
  actor::{Actor, ActorPatch, NewActor},
  entity::EntityClass,
  policy::{self, Operation},
  store::PeopleStore,
};
use uuid::Uuid;

use crate::{AppState, CurrentActor, error::ApiError, guard};

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /me`
pub async fn me<S: PeopleStore>(CurrentActor(actor): CurrentActor) -> Json<Actor> { Json(actor) }

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /actors`
pub async fn list<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
) -> Result<Json<Vec<Actor>>, ApiError> {
  let actors = state.store.list_actors().await.map_err(ApiError::store)?;
  let roster = pdi_core::actor::index(actors.iter().cloned());
  Ok(Json(policy::filter_visible(&actor, actors, &roster)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /actors/:id`
pub async fn get_one<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<Actor>, ApiError> {
  let not_found = || ApiError::NotFound(format!("actor {id} not found"));
  let target = state
    .store
    .get_actor(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  if !policy::is_allowed(&actor, &target, Operation::Read, guard::NOBODY) {
    return Err(not_found());
  }
  Ok(Json(target))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /actors`: returns 201 + the stored actor.
pub async fn create<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewActor>,
) -> Result<impl IntoResponse, ApiError> {
  guard::authorize_class(&actor, EntityClass::RoleAssignment, Operation::Write)?;
  let created = state.store.add_actor(body).await.map_err(ApiError::store)?;
  tracing::info!(
    by = %actor.actor_id,
    actor_id = %created.actor_id,
    role = %created.role,
    "actor created"
  );
  Ok((StatusCode::CREATED, Json(created)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /actors/:id`: role, status, name or supervisor.
pub async fn update<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  Json(patch): Json<ActorPatch>,
) -> Result<Json<Actor>, ApiError> {
  guard::authorize_class(&actor, EntityClass::RoleAssignment, Operation::Write)?;
  if patch.supervisor_id == Some(Some(id)) {
    return Err(ApiError::BadRequest("an actor cannot supervise itself".into()));
  }
  let updated = state
    .store
    .update_actor(id, patch)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(by = %actor.actor_id, actor_id = %id, "actor updated");
  Ok(Json(updated))
}
