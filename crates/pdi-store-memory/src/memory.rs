//! [`MemoryStore`]: a `PeopleStore` held entirely in memory.
//!
//! Not durable. Used as the sample-data source in degraded mode and as a
//! dependency-free backend for tests.

use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use pdi_core::{
  Error, Result,
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityPatch, NewEntity, OwnedEntity, validate_score},
  role::ActorStatus,
  sample::SampleData,
  store::{EntityQuery, PeopleStore},
  team::{NewTeam, Team},
};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
struct State {
  actors:   HashMap<Uuid, Actor>,
  teams:    HashMap<Uuid, Team>,
  entities: HashMap<Uuid, OwnedEntity>,
}

impl State {
  fn require_actor(&self, id: Uuid) -> Result<&Actor> {
    self.actors.get(&id).ok_or(Error::ActorNotFound(id))
  }

  /// Fill in the derived fields a stored row does not own.
  fn resolve_entity(&self, entity: &OwnedEntity) -> OwnedEntity {
    let mut out = entity.clone();
    out.display_name = self
      .actors
      .get(&entity.owner_id)
      .map(|a| a.name.clone())
      .unwrap_or_default();
    out.confidential = false;
    out
  }

  fn resolve_team(&self, team: &Team) -> Team {
    let mut members: Vec<&Actor> = self
      .actors
      .values()
      .filter(|a| a.team_id == Some(team.team_id))
      .collect();
    members.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = team.clone();
    out.member_ids = members.into_iter().map(|a| a.actor_id).collect();
    out
  }
}

/// Cloning is cheap: clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  state: Arc<RwLock<State>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  /// A store pre-populated with `data`, ids preserved.
  pub fn from_sample(data: SampleData) -> Self {
    let state = State {
      actors:   data.actors.into_iter().map(|a| (a.actor_id, a)).collect(),
      teams:    data.teams.into_iter().map(|t| (t.team_id, t)).collect(),
      entities: data.entities.into_iter().map(|e| (e.entity_id, e)).collect(),
    };
    Self { state: Arc::new(RwLock::new(state)) }
  }

  pub fn with_sample() -> Self { Self::from_sample(SampleData::load()) }
}

impl PeopleStore for MemoryStore {
  type Error = Error;

  // ── Actors ────────────────────────────────────────────────────────────────

  async fn add_actor(&self, input: NewActor) -> Result<Actor> {
    let mut state = self.state.write().await;
    if let Some(supervisor_id) = input.supervisor_id {
      state.require_actor(supervisor_id)?;
    }

    let actor = Actor {
      actor_id:      Uuid::new_v4(),
      name:          input.name,
      email:         input.email,
      role:          input.role,
      status:        ActorStatus::Ativo,
      supervisor_id: input.supervisor_id,
      team_id:       None,
      created_at:    Utc::now(),
    };
    state.actors.insert(actor.actor_id, actor.clone());
    Ok(actor)
  }

  async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>> {
    Ok(self.state.read().await.actors.get(&id).cloned())
  }

  async fn list_actors(&self) -> Result<Vec<Actor>> {
    let state = self.state.read().await;
    let mut actors: Vec<Actor> = state.actors.values().cloned().collect();
    actors.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(actors)
  }

  async fn update_actor(&self, id: Uuid, patch: ActorPatch) -> Result<Actor> {
    let mut state = self.state.write().await;
    if let Some(Some(supervisor_id)) = patch.supervisor_id {
      state.require_actor(supervisor_id)?;
    }
    let actor = state.actors.get_mut(&id).ok_or(Error::ActorNotFound(id))?;
    patch.apply(actor);
    Ok(actor.clone())
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  async fn add_team(&self, input: NewTeam) -> Result<Team> {
    let mut state = self.state.write().await;
    state.require_actor(input.leader_id)?;

    let team = Team {
      team_id:    Uuid::new_v4(),
      name:       input.name,
      leader_id:  input.leader_id,
      member_ids: Vec::new(),
      created_at: Utc::now(),
    };
    state.teams.insert(team.team_id, team.clone());
    Ok(team)
  }

  async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
    let state = self.state.read().await;
    Ok(state.teams.get(&id).map(|t| state.resolve_team(t)))
  }

  async fn list_teams(&self) -> Result<Vec<Team>> {
    let state = self.state.read().await;
    let mut teams: Vec<Team> = state.teams.values().map(|t| state.resolve_team(t)).collect();
    teams.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(teams)
  }

  async fn assign_team(&self, actor_id: Uuid, team_id: Option<Uuid>) -> Result<Actor> {
    let mut state = self.state.write().await;
    if let Some(team_id) = team_id
      && !state.teams.contains_key(&team_id)
    {
      return Err(Error::TeamNotFound(team_id));
    }
    let actor = state
      .actors
      .get_mut(&actor_id)
      .ok_or(Error::ActorNotFound(actor_id))?;
    actor.team_id = team_id;
    Ok(actor.clone())
  }

  // ── Owned entities ────────────────────────────────────────────────────────

  async fn add_entity(&self, input: NewEntity) -> Result<OwnedEntity> {
    let mut state = self.state.write().await;
    state.require_actor(input.owner_id)?;

    let now = Utc::now();
    let entity = OwnedEntity {
      entity_id:          Uuid::new_v4(),
      class:              input.class,
      owner_id:           input.owner_id,
      secondary_actor_id: input.secondary_actor_id,
      sensitivity:        input.resolved_sensitivity(),
      display_name:       String::new(),
      confidential:       false,
      title:              input.title,
      body:               input.body,
      score:              None,
      created_at:         now,
      updated_at:         now,
    };
    let resolved = state.resolve_entity(&entity);
    state.entities.insert(entity.entity_id, entity);
    Ok(resolved)
  }

  async fn get_entity(&self, id: Uuid) -> Result<Option<OwnedEntity>> {
    let state = self.state.read().await;
    Ok(state.entities.get(&id).map(|e| state.resolve_entity(e)))
  }

  async fn list_entities<'a>(&'a self, query: &'a EntityQuery) -> Result<Vec<OwnedEntity>> {
    let state = self.state.read().await;
    let mut out: Vec<OwnedEntity> = state
      .entities
      .values()
      .filter(|e| query.matches(e))
      .map(|e| state.resolve_entity(e))
      .collect();
    out.sort_by_key(|e| (e.created_at, e.entity_id));
    Ok(out)
  }

  async fn update_entity(&self, id: Uuid, patch: EntityPatch) -> Result<OwnedEntity> {
    let mut state = self.state.write().await;
    let entity = state.entities.get_mut(&id).ok_or(Error::EntityNotFound(id))?;
    patch.apply(entity);
    entity.updated_at = Utc::now();
    let entity = entity.clone();
    Ok(state.resolve_entity(&entity))
  }

  async fn set_score(&self, id: Uuid, score: u8) -> Result<OwnedEntity> {
    let score = validate_score(score)?;
    let mut state = self.state.write().await;
    let entity = state.entities.get_mut(&id).ok_or(Error::EntityNotFound(id))?;
    entity.score = Some(score);
    entity.updated_at = Utc::now();
    let entity = entity.clone();
    Ok(state.resolve_entity(&entity))
  }

  async fn delete_entity(&self, id: Uuid) -> Result<bool> {
    Ok(self.state.write().await.entities.remove(&id).is_some())
  }
}
