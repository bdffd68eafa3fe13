//! The `PeopleStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (`pdi-store-sqlite`,
//! `pdi-store-memory`). Higher layers (`pdi-api`, `pdi-server`) depend on this
//! abstraction, not on any concrete backend.
//!
//! Stores do not evaluate policy. They return what they hold; the caller runs
//! [`crate::policy`] and [`crate::mask`] over the result.

use std::future::Future;

use uuid::Uuid;

use crate::{
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityClass, EntityPatch, NewEntity, OwnedEntity},
  team::{NewTeam, Team},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`PeopleStore::list_entities`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityQuery {
  pub class:    Option<EntityClass>,
  pub owner_id: Option<Uuid>,
}

impl EntityQuery {
  pub fn class(class: EntityClass) -> Self { Self { class: Some(class), owner_id: None } }

  pub fn matches(&self, entity: &OwnedEntity) -> bool {
    self.class.is_none_or(|c| c == entity.class)
      && self.owner_id.is_none_or(|o| o == entity.owner_id)
  }
}

// ─── Error classification ────────────────────────────────────────────────────

/// Lets the data-access boundary tell a domain rejection (not found, invalid
/// input, an undecodable stored row) from a failure of the datastore itself.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The domain-level error this wraps, or `None` if the datastore failed.
  fn domain(&self) -> Option<&crate::Error>;

  fn is_unavailable(&self) -> bool { self.domain().is_none() }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a people-store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PeopleStore: Send + Sync {
  type Error: StoreError;

  // ── Actors ────────────────────────────────────────────────────────────

  /// Create and persist a new active actor. The supervisor, if given, must
  /// exist.
  fn add_actor(
    &self,
    input: NewActor,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  /// Retrieve an actor by UUID. Returns `None` if not found.
  fn get_actor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Actor>, Self::Error>> + Send + '_;

  fn list_actors(&self) -> impl Future<Output = Result<Vec<Actor>, Self::Error>> + Send + '_;

  /// Change role, status, name or supervisor. Actors are never deleted;
  /// deactivation is `status = inativo`.
  fn update_actor(
    &self,
    id: Uuid,
    patch: ActorPatch,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  // ── Teams ─────────────────────────────────────────────────────────────

  fn add_team(
    &self,
    input: NewTeam,
  ) -> impl Future<Output = Result<Team, Self::Error>> + Send + '_;

  fn get_team(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + '_;

  fn list_teams(&self) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  /// Move an actor into `team_id`, or out of any team with `None`.
  fn assign_team(
    &self,
    actor_id: Uuid,
    team_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Actor, Self::Error>> + Send + '_;

  // ── Owned entities ────────────────────────────────────────────────────

  /// Persist a new record. Fails with [`crate::Error::ActorNotFound`] if the
  /// owner does not exist.
  fn add_entity(
    &self,
    input: NewEntity,
  ) -> impl Future<Output = Result<OwnedEntity, Self::Error>> + Send + '_;

  fn get_entity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<OwnedEntity>, Self::Error>> + Send + '_;

  fn list_entities<'a>(
    &'a self,
    query: &'a EntityQuery,
  ) -> impl Future<Output = Result<Vec<OwnedEntity>, Self::Error>> + Send + 'a;

  /// Edit title and body.
  fn update_entity(
    &self,
    id: Uuid,
    patch: EntityPatch,
  ) -> impl Future<Output = Result<OwnedEntity, Self::Error>> + Send + '_;

  /// Record an evaluation score (1..=5).
  fn set_score(
    &self,
    id: Uuid,
    score: u8,
  ) -> impl Future<Output = Result<OwnedEntity, Self::Error>> + Send + '_;

  /// Delete a record. Returns `false` if nothing was deleted.
  fn delete_entity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
