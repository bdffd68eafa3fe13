//! Tests for `MemoryStore` and the Live → Degraded behaviour of
//! `FallbackStore`.

use std::sync::{
  Arc,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use pdi_core::{
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityClass, EntityPatch, NewEntity, OwnedEntity},
  mode::{DataSourceMode, ModeController},
  role::Role,
  sample::{self, SampleData},
  store::{EntityQuery, PeopleStore, StoreError},
  team::{NewTeam, Team},
};
use uuid::Uuid;

use crate::{FallbackStore, MemoryStore};

// ─── A live store that can be switched off ───────────────────────────────────

#[derive(Debug, thiserror::Error)]
enum FlakyError {
  #[error("connection refused")]
  Down,
  #[error(transparent)]
  Domain(#[from] pdi_core::Error),
}

impl StoreError for FlakyError {
  fn domain(&self) -> Option<&pdi_core::Error> {
    match self {
      FlakyError::Down => None,
      FlakyError::Domain(e) => Some(e),
    }
  }
}

#[derive(Default)]
struct Flaky {
  inner: MemoryStore,
  down:  AtomicBool,
  calls: AtomicUsize,
}

impl Flaky {
  fn set_down(&self, down: bool) { self.down.store(down, Ordering::SeqCst) }

  fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

  fn check(&self) -> Result<(), FlakyError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.down.load(Ordering::SeqCst) {
      Err(FlakyError::Down)
    } else {
      Ok(())
    }
  }
}

impl PeopleStore for Flaky {
  type Error = FlakyError;

  async fn add_actor(&self, input: NewActor) -> Result<Actor, FlakyError> {
    self.check()?;
    Ok(self.inner.add_actor(input).await?)
  }

  async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>, FlakyError> {
    self.check()?;
    Ok(self.inner.get_actor(id).await?)
  }

  async fn list_actors(&self) -> Result<Vec<Actor>, FlakyError> {
    self.check()?;
    Ok(self.inner.list_actors().await?)
  }

  async fn update_actor(&self, id: Uuid, patch: ActorPatch) -> Result<Actor, FlakyError> {
    self.check()?;
    Ok(self.inner.update_actor(id, patch).await?)
  }

  async fn add_team(&self, input: NewTeam) -> Result<Team, FlakyError> {
    self.check()?;
    Ok(self.inner.add_team(input).await?)
  }

  async fn get_team(&self, id: Uuid) -> Result<Option<Team>, FlakyError> {
    self.check()?;
    Ok(self.inner.get_team(id).await?)
  }

  async fn list_teams(&self) -> Result<Vec<Team>, FlakyError> {
    self.check()?;
    Ok(self.inner.list_teams().await?)
  }

  async fn assign_team(&self, actor_id: Uuid, team_id: Option<Uuid>) -> Result<Actor, FlakyError> {
    self.check()?;
    Ok(self.inner.assign_team(actor_id, team_id).await?)
  }

  async fn add_entity(&self, input: NewEntity) -> Result<OwnedEntity, FlakyError> {
    self.check()?;
    Ok(self.inner.add_entity(input).await?)
  }

  async fn get_entity(&self, id: Uuid) -> Result<Option<OwnedEntity>, FlakyError> {
    self.check()?;
    Ok(self.inner.get_entity(id).await?)
  }

  async fn list_entities<'a>(
    &'a self,
    query: &'a EntityQuery,
  ) -> Result<Vec<OwnedEntity>, FlakyError> {
    self.check()?;
    Ok(self.inner.list_entities(query).await?)
  }

  async fn update_entity(&self, id: Uuid, patch: EntityPatch) -> Result<OwnedEntity, FlakyError> {
    self.check()?;
    Ok(self.inner.update_entity(id, patch).await?)
  }

  async fn set_score(&self, id: Uuid, score: u8) -> Result<OwnedEntity, FlakyError> {
    self.check()?;
    Ok(self.inner.set_score(id, score).await?)
  }

  async fn delete_entity(&self, id: Uuid) -> Result<bool, FlakyError> {
    self.check()?;
    Ok(self.inner.delete_entity(id).await?)
  }
}

/// A fallback store whose live side holds one actor with one objective.
async fn fallback() -> (FallbackStore<Flaky>, Arc<ModeController>, Actor) {
  let live = Flaky::default();
  let ana = live
    .inner
    .add_actor(NewActor::new("Ana Live", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  live
    .inner
    .add_entity(NewEntity::new(EntityClass::PdiObjective, ana.actor_id, "Live objective"))
    .await
    .unwrap();

  let mode = Arc::new(ModeController::default());
  (FallbackStore::new(live, mode.clone()), mode, ana)
}

// ─── MemoryStore ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn memory_store_resolves_display_names() {
  let s = MemoryStore::new();
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  let e = s
    .add_entity(NewEntity::new(EntityClass::Achievement, ana.actor_id, "Certificação"))
    .await
    .unwrap();
  assert_eq!(e.display_name, "Ana");

  s.update_actor(ana.actor_id, ActorPatch { name: Some("Ana Prado".into()), ..Default::default() })
    .await
    .unwrap();
  let e = s.get_entity(e.entity_id).await.unwrap().unwrap();
  assert_eq!(e.display_name, "Ana Prado");
}

#[tokio::test]
async fn memory_store_rejects_unknown_references() {
  let s = MemoryStore::new();
  let ghost = Uuid::new_v4();
  assert_eq!(
    s.add_entity(NewEntity::new(EntityClass::PdiObjective, ghost, "x")).await,
    Err(pdi_core::Error::ActorNotFound(ghost))
  );
  assert_eq!(
    s.add_team(NewTeam { name: "T".into(), leader_id: ghost }).await,
    Err(pdi_core::Error::ActorNotFound(ghost))
  );
  assert_eq!(
    s.set_score(ghost, 3).await,
    Err(pdi_core::Error::EntityNotFound(ghost))
  );
}

#[tokio::test]
async fn memory_store_sample_matches_sample_data() {
  let s = MemoryStore::with_sample();
  let data = SampleData::load();
  assert_eq!(s.list_actors().await.unwrap().len(), data.actors.len());
  assert_eq!(
    s.list_entities(&EntityQuery::default()).await.unwrap().len(),
    data.entities.len()
  );
  let team = s.get_team(sample::TEAM_PRODUTO).await.unwrap().unwrap();
  assert_eq!(team.member_ids.len(), 3);
}

// ─── FallbackStore ───────────────────────────────────────────────────────────

#[tokio::test]
async fn live_mode_serves_live_data() {
  let (store, mode, ana) = fallback().await;
  let entities = store.list_entities(&EntityQuery::default()).await.unwrap();
  assert_eq!(entities.len(), 1);
  assert_eq!(entities[0].owner_id, ana.actor_id);
  assert_eq!(mode.mode(), DataSourceMode::Live);
}

#[tokio::test]
async fn live_failure_degrades_and_serves_sample_data() {
  let (store, mode, _) = fallback().await;
  store.live().set_down(true);

  let sample_entities = SampleData::load().entities;
  for _ in 0..3 {
    let entities = store.list_entities(&EntityQuery::default()).await.unwrap();
    assert_eq!(entities.len(), sample_entities.len());
    assert!(entities.iter().any(|e| e.owner_id == sample::BRUNO));
  }
  assert_eq!(mode.mode(), DataSourceMode::Degraded);
  // Only the first call reached the live store.
  assert_eq!(store.live().calls(), 1);
}

#[tokio::test]
async fn degraded_mode_is_sticky_until_toggled() {
  let (store, mode, ana) = fallback().await;
  store.live().set_down(true);
  store.list_actors().await.unwrap();
  assert_eq!(mode.mode(), DataSourceMode::Degraded);

  // The live store recovers, but nothing probes it.
  store.live().set_down(false);
  let actors = store.list_actors().await.unwrap();
  assert!(actors.iter().all(|a| a.actor_id != ana.actor_id));
  assert_eq!(mode.mode(), DataSourceMode::Degraded);

  mode.set_mode(DataSourceMode::Live);
  let actors = store.list_actors().await.unwrap();
  assert_eq!(actors.len(), 1);
  assert_eq!(actors[0].actor_id, ana.actor_id);
}

#[tokio::test]
async fn domain_errors_do_not_degrade() {
  let (store, mode, _) = fallback().await;
  let ghost = Uuid::new_v4();
  let err = store.update_actor(ghost, ActorPatch::default()).await.unwrap_err();
  assert_eq!(err, pdi_core::Error::ActorNotFound(ghost));
  assert_eq!(mode.mode(), DataSourceMode::Live);
}

#[tokio::test]
async fn writes_fall_back_to_sample_store() {
  let (store, mode, _) = fallback().await;
  store.live().set_down(true);

  let e = store
    .add_entity(NewEntity::new(EntityClass::Comment, sample::BRUNO, "Comentário offline"))
    .await
    .unwrap();
  assert_eq!(e.display_name, "Bruno Santos");
  assert_eq!(mode.mode(), DataSourceMode::Degraded);
  assert!(store.get_entity(e.entity_id).await.unwrap().is_some());
}

#[tokio::test]
async fn degraded_reads_have_live_shape() {
  let (store, _, _) = fallback().await;
  let live = store.get_actor(Uuid::nil()).await.unwrap();
  assert!(live.is_none());

  store.live().set_down(true);
  let sampled: Option<Actor> = store.get_actor(sample::ADMIN).await.unwrap();
  let admin = sampled.unwrap();
  assert_eq!(admin.role, Role::Admin);
}
