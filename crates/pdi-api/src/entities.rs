//! Handlers for `/entities` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/entities` | Optional `?class=` and `?owner_id=`; only readable records, masked |
//! | `GET`    | `/entities/:id` | 404 if absent or not readable |
//! | `POST`   | `/entities` | Body: [`NewEntity`]; returns 201 |
//! | `PATCH`  | `/entities/:id` | Body: [`EntityPatch`] |
//! | `POST`   | `/entities/:id/evaluate` | Body: `{"score":1..5}` |
//! | `DELETE` | `/entities/:id` | 204 on success |
//!
//! A record the caller cannot read is reported as missing. A record the caller
//! can read but not change is a 403 carrying the denial reason. The
//! `owner_id` filter matches owners as the caller sees them after masking, so
//! it never selects records whose subject is hidden.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use pdi_core::{
  actor::Actor,
  entity::{EntityClass, EntityPatch, NewEntity, OwnedEntity},
  mask,
  policy::{self, Operation},
  store::{EntityQuery, PeopleStore},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, CurrentActor, error::ApiError, guard};

/// Load a record and check the caller may read it. Returns the record with
/// the owner roster used for the check.
async fn load_readable<S: PeopleStore>(
  store: &S,
  actor: &Actor,
  id: Uuid,
) -> Result<(OwnedEntity, Vec<Actor>), ApiError> {
  let not_found = || ApiError::NotFound(format!("entity {id} not found"));
  let entity = store
    .get_entity(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(not_found)?;
  let roster = guard::owner_roster(store, entity.owner_id).await?;
  if !policy::is_allowed(actor, &entity, Operation::Read, &roster) {
    return Err(not_found());
  }
  Ok((entity, roster))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub class:    Option<EntityClass>,
  pub owner_id: Option<Uuid>,
}

/// `GET /entities[?class=<class>][&owner_id=<id>]`
pub async fn list<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OwnedEntity>>, ApiError> {
  let query = EntityQuery { class: params.class, owner_id: None };
  let entities = state
    .store
    .list_entities(&query)
    .await
    .map_err(ApiError::store)?;
  let roster = guard::full_roster(state.store.as_ref()).await?;

  let visible = policy::filter_visible(&actor, entities, &roster);
  let mut masked = mask::mask(visible, &actor);
  if let Some(owner_id) = params.owner_id {
    masked.retain(|e| e.owner_id == owner_id);
  }
  Ok(Json(masked))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entities/:id`
pub async fn get_one<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<Json<OwnedEntity>, ApiError> {
  let (entity, _) = load_readable(state.store.as_ref(), &actor, id).await?;
  Ok(Json(mask::mask_one(entity, &actor)))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /entities`: the caller must be allowed to write the record it is
/// creating. Returns 201 + the stored record, masked for the caller.
pub async fn create<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewEntity>,
) -> Result<impl IntoResponse, ApiError> {
  if body.title.trim().is_empty() {
    return Err(ApiError::BadRequest("title must not be empty".into()));
  }
  let roster = guard::owner_roster(state.store.as_ref(), body.owner_id).await?;
  guard::authorize(&actor, &body, Operation::Write, &roster)?;

  let entity = state.store.add_entity(body).await.map_err(ApiError::store)?;
  tracing::info!(
    by = %actor.actor_id,
    entity_id = %entity.entity_id,
    class = %entity.class,
    "entity created"
  );
  Ok((StatusCode::CREATED, Json(mask::mask_one(entity, &actor))))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /entities/:id`: edit title and body.
pub async fn update<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  Json(patch): Json<EntityPatch>,
) -> Result<Json<OwnedEntity>, ApiError> {
  if patch.is_empty() {
    return Err(ApiError::BadRequest("nothing to update".into()));
  }
  let (entity, roster) = load_readable(state.store.as_ref(), &actor, id).await?;
  guard::authorize(&actor, &entity, Operation::Write, &roster)?;

  let updated = state
    .store
    .update_entity(id, patch)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(mask::mask_one(updated, &actor)))
}

// ─── Evaluate ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EvaluateBody {
  pub score: u8,
}

/// `POST /entities/:id/evaluate`: body: `{"score":4}`
pub async fn evaluate_one<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
  Json(body): Json<EvaluateBody>,
) -> Result<Json<OwnedEntity>, ApiError> {
  let (entity, roster) = load_readable(state.store.as_ref(), &actor, id).await?;
  guard::authorize(&actor, &entity, Operation::Evaluate, &roster)?;

  let scored = state
    .store
    .set_score(id, body.score)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(by = %actor.actor_id, entity_id = %id, score = body.score, "entity evaluated");
  Ok(Json(mask::mask_one(scored, &actor)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /entities/:id`
pub async fn delete_one<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let (entity, roster) = load_readable(state.store.as_ref(), &actor, id).await?;
  guard::authorize(&actor, &entity, Operation::Delete, &roster)?;

  if !state.store.delete_entity(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("entity {id} not found")));
  }
  tracing::info!(by = %actor.actor_id, entity_id = %id, "entity deleted");
  Ok(StatusCode::NO_CONTENT)
}
