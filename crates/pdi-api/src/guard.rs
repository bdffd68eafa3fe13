//! Policy checks shared by the handlers.

use pdi_core::{
  actor::{self, Actor, Roster},
  entity::{EntityClass, Owned, Probe},
  policy::{self, Operation, VisibilityDecision},
  store::PeopleStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// A roster with nobody in it, for checks that never consult the hierarchy.
pub const NOBODY: &[Actor] = &[];

/// Run the evaluator and turn a denial into [`ApiError::Forbidden`].
pub fn authorize<E, R>(
  actor: &Actor,
  entity: &E,
  op: Operation,
  roster: &R,
) -> Result<VisibilityDecision, ApiError>
where
  E: Owned + ?Sized,
  R: Roster + ?Sized,
{
  let decision = policy::evaluate(actor, entity, op, roster);
  if decision.allow {
    Ok(decision)
  } else {
    tracing::debug!(
      actor_id = %actor.actor_id,
      class = %entity.class(),
      ?op,
      reason = ?decision.reason,
      "denied"
    );
    Err(ApiError::Forbidden(decision.reason))
  }
}

/// Admin-only operations on a class as a whole (role assignment, settings).
pub fn authorize_class(actor: &Actor, class: EntityClass, op: Operation) -> Result<(), ApiError> {
  authorize(actor, &Probe::unowned(class), op, NOBODY).map(|_| ())
}

/// Just enough of the roster to evaluate one record: its owner.
pub async fn owner_roster<S: PeopleStore>(store: &S, owner_id: Uuid) -> Result<Vec<Actor>, ApiError> {
  if owner_id.is_nil() {
    return Ok(Vec::new());
  }
  let owner = store.get_actor(owner_id).await.map_err(ApiError::store)?;
  Ok(owner.into_iter().collect())
}

/// Every actor, indexed, for filtering whole listings.
pub async fn full_roster<S: PeopleStore>(
  store: &S,
) -> Result<std::collections::HashMap<Uuid, Actor>, ApiError> {
  let actors = store.list_actors().await.map_err(ApiError::store)?;
  Ok(actor::index(actors))
}
