//! Confidentiality masking.
//!
//! Applied to records an actor is already allowed to see. For confidential
//! records the subject's identity (name, owner id and linked actor) is
//! withheld unless the viewer is `rh` or is the subject. Masking works on the
//! values handed back to the caller; stored records are never touched.

use uuid::Uuid;

use crate::{
  actor::Actor,
  entity::{Owned, OwnedEntity},
  role::Role,
};

/// Shown in place of the subject's name on masked records.
pub const CONFIDENTIAL_PLACEHOLDER: &str = "Colaborador confidencial";

/// Whether `entity` must have its subject identity hidden from `actor`.
pub fn requires_masking<E: Owned + ?Sized>(actor: &Actor, entity: &E) -> bool {
  if !entity.sensitivity().is_confidential() || actor.role == Role::Rh {
    return false;
  }
  let owner_id = entity.owner_id();
  owner_id.is_nil() || owner_id != actor.actor_id
}

pub fn mask_one(mut record: OwnedEntity, actor: &Actor) -> OwnedEntity {
  if requires_masking(actor, &record) {
    record.display_name = CONFIDENTIAL_PLACEHOLDER.to_owned();
    record.owner_id = Uuid::nil();
    record.secondary_actor_id = None;
    record.confidential = true;
  } else {
    record.confidential = false;
  }
  record
}

/// Mask every record for `actor`. Preserves count, order and every field
/// other than the identity fields and `confidential`. Idempotent.
pub fn mask(records: Vec<OwnedEntity>, actor: &Actor) -> Vec<OwnedEntity> {
  records.into_iter().map(|r| mask_one(r, actor)).collect()
}
