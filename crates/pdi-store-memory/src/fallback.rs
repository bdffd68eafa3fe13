//! [`FallbackStore`]: the data-access boundary between the live backend and
//! the sample dataset.
//!
//! While the shared [`ModeController`] says `Live`, every call goes to the
//! live store. A failure of the live store itself (anything that is not a
//! domain rejection) flips the controller to `Degraded` and the same call is
//! answered from sample data instead, so the caller never sees the outage.
//! From then on the live store is not consulted until someone switches the
//! controller back by hand.

use std::{future::Future, sync::Arc};

use pdi_core::{
  Error, Result,
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityPatch, NewEntity, OwnedEntity},
  mode::ModeController,
  store::{EntityQuery, PeopleStore, StoreError},
  team::{NewTeam, Team},
};
use uuid::Uuid;

pub struct FallbackStore<L> {
  live:   L,
  sample: super::MemoryStore,
  mode:   Arc<ModeController>,
}

impl<L: PeopleStore> FallbackStore<L> {
  /// Wrap `live`, degrading to the built-in sample dataset.
  pub fn new(live: L, mode: Arc<ModeController>) -> Self {
    Self::with_sample(live, super::MemoryStore::with_sample(), mode)
  }

  pub fn with_sample(live: L, sample: super::MemoryStore, mode: Arc<ModeController>) -> Self {
    Self { live, sample, mode }
  }

  pub fn mode(&self) -> &Arc<ModeController> { &self.mode }

  pub fn live(&self) -> &L { &self.live }

  async fn route<'a, T, LFut, SFut>(
    &'a self,
    operation: &'static str,
    live: impl FnOnce(&'a L) -> LFut + Send,
    sample: impl FnOnce(&'a super::MemoryStore) -> SFut + Send,
  ) -> Result<T>
  where
    T: Send,
    LFut: Future<Output = Result<T, L::Error>> + Send,
    SFut: Future<Output = Result<T>> + Send,
  {
    if !self.mode.is_degraded() {
      match live(&self.live).await {
        Ok(value) => return Ok(value),
        Err(e) => {
          if let Some(domain) = e.domain() {
            return Err(domain.clone());
          }
          if self.mode.record_failure() {
            tracing::warn!(
              operation,
              error = %e,
              "live data source failed; serving sample data until switched back"
            );
          }
        }
      }
    }

    tracing::debug!(operation, "serving from sample data");
    sample(&self.sample).await
  }
}

impl<L: PeopleStore> PeopleStore for FallbackStore<L> {
  type Error = Error;

  async fn add_actor(&self, input: NewActor) -> Result<Actor> {
    let retry = input.clone();
    self
      .route("add_actor", move |s| s.add_actor(input), move |s| s.add_actor(retry))
      .await
  }

  async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>> {
    self
      .route("get_actor", move |s| s.get_actor(id), move |s| s.get_actor(id))
      .await
  }

  async fn list_actors(&self) -> Result<Vec<Actor>> {
    self
      .route("list_actors", |s| s.list_actors(), |s| s.list_actors())
      .await
  }

  async fn update_actor(&self, id: Uuid, patch: ActorPatch) -> Result<Actor> {
    let retry = patch.clone();
    self
      .route(
        "update_actor",
        move |s| s.update_actor(id, patch),
        move |s| s.update_actor(id, retry),
      )
      .await
  }

  async fn add_team(&self, input: NewTeam) -> Result<Team> {
    let retry = input.clone();
    self
      .route("add_team", move |s| s.add_team(input), move |s| s.add_team(retry))
      .await
  }

  async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
    self
      .route("get_team", move |s| s.get_team(id), move |s| s.get_team(id))
      .await
  }

  async fn list_teams(&self) -> Result<Vec<Team>> {
    self
      .route("list_teams", |s| s.list_teams(), |s| s.list_teams())
      .await
  }

  async fn assign_team(&self, actor_id: Uuid, team_id: Option<Uuid>) -> Result<Actor> {
    self
      .route(
        "assign_team",
        move |s| s.assign_team(actor_id, team_id),
        move |s| s.assign_team(actor_id, team_id),
      )
      .await
  }

  async fn add_entity(&self, input: NewEntity) -> Result<OwnedEntity> {
    let retry = input.clone();
    self
      .route("add_entity", move |s| s.add_entity(input), move |s| s.add_entity(retry))
      .await
  }

  async fn get_entity(&self, id: Uuid) -> Result<Option<OwnedEntity>> {
    self
      .route("get_entity", move |s| s.get_entity(id), move |s| s.get_entity(id))
      .await
  }

  async fn list_entities<'a>(&'a self, query: &'a EntityQuery) -> Result<Vec<OwnedEntity>> {
    self
      .route(
        "list_entities",
        move |s| s.list_entities(query),
        move |s| s.list_entities(query),
      )
      .await
  }

  async fn update_entity(&self, id: Uuid, patch: EntityPatch) -> Result<OwnedEntity> {
    let retry = patch.clone();
    self
      .route(
        "update_entity",
        move |s| s.update_entity(id, patch),
        move |s| s.update_entity(id, retry),
      )
      .await
  }

  async fn set_score(&self, id: Uuid, score: u8) -> Result<OwnedEntity> {
    self
      .route("set_score", move |s| s.set_score(id, score), move |s| s.set_score(id, score))
      .await
  }

  async fn delete_entity(&self, id: Uuid) -> Result<bool> {
    self
      .route("delete_entity", move |s| s.delete_entity(id), move |s| s.delete_entity(id))
      .await
  }
}
