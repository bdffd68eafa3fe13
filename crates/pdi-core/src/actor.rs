//! Actors (authenticated users with a role) and the [`Roster`] lookup the
//! policy evaluator uses to walk one level of the supervisor hierarchy.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::role::{ActorStatus, Role};

/// An authenticated user of the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
  pub actor_id:      Uuid,
  pub name:          String,
  pub email:         String,
  pub role:          Role,
  pub status:        ActorStatus,
  /// The actor's direct manager, if any.
  pub supervisor_id: Option<Uuid>,
  /// Authoritative team membership; an actor is in at most one team.
  pub team_id:       Option<Uuid>,
  pub created_at:    DateTime<Utc>,
}

impl Actor {
  pub fn is_active(&self) -> bool { self.status == ActorStatus::Ativo }
}

/// Input to [`crate::store::PeopleStore::add_actor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewActor {
  pub name:          String,
  pub email:         String,
  pub role:          Role,
  #[serde(default)]
  pub supervisor_id: Option<Uuid>,
}

impl NewActor {
  pub fn new(name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
    Self {
      name: name.into(),
      email: email.into(),
      role,
      supervisor_id: None,
    }
  }

  pub fn reporting_to(mut self, supervisor_id: Uuid) -> Self {
    self.supervisor_id = Some(supervisor_id);
    self
  }
}

/// Partial update applied by [`crate::store::PeopleStore::update_actor`].
///
/// `supervisor_id` is doubly optional: `Some(None)` clears the link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorPatch {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub role:          Option<Role>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub status:        Option<ActorStatus>,
  #[serde(
    default,
    deserialize_with = "double_option::deserialize",
    skip_serializing_if = "Option::is_none"
  )]
  pub supervisor_id: Option<Option<Uuid>>,
}

impl ActorPatch {
  pub fn apply(self, actor: &mut Actor) {
    if let Some(name) = self.name {
      actor.name = name;
    }
    if let Some(role) = self.role {
      actor.role = role;
    }
    if let Some(status) = self.status {
      actor.status = status;
    }
    if let Some(supervisor_id) = self.supervisor_id {
      actor.supervisor_id = supervisor_id;
    }
  }
}

/// Distinguishes an absent field from an explicit `null`.
mod double_option {
  use serde::{Deserialize, Deserializer};

  pub fn deserialize<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
  where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
  {
    Option::<T>::deserialize(de).map(Some)
  }
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// Read-only lookup of actors by id.
pub trait Roster {
  fn actor(&self, actor_id: Uuid) -> Option<&Actor>;

  /// The direct supervisor of `actor_id`, if the actor is known and has one.
  fn supervisor_of(&self, actor_id: Uuid) -> Option<Uuid> {
    self.actor(actor_id).and_then(|a| a.supervisor_id)
  }
}

impl Roster for HashMap<Uuid, Actor> {
  fn actor(&self, actor_id: Uuid) -> Option<&Actor> { self.get(&actor_id) }
}

impl Roster for [Actor] {
  fn actor(&self, actor_id: Uuid) -> Option<&Actor> {
    self.iter().find(|a| a.actor_id == actor_id)
  }
}

impl Roster for Vec<Actor> {
  fn actor(&self, actor_id: Uuid) -> Option<&Actor> { self.as_slice().actor(actor_id) }
}

/// Index a list of actors by id.
pub fn index(actors: impl IntoIterator<Item = Actor>) -> HashMap<Uuid, Actor> {
  actors.into_iter().map(|a| (a.actor_id, a)).collect()
}
