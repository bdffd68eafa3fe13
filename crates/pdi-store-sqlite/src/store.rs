//! [`SqliteStore`]: the SQLite implementation of [`PeopleStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use pdi_core::{
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityPatch, NewEntity, OwnedEntity, validate_score},
  role::{ActorStatus, Role},
  store::{EntityQuery, PeopleStore},
  team::{NewTeam, Team},
};

use crate::{
  Error, Result,
  encode::{
    ACTOR_COLUMNS, ENTITY_SELECT, RawActor, RawEntityRow, RawTeam, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A PDI people store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// Tables that can be probed with [`SqliteStore::exists`].
#[derive(Clone, Copy)]
enum Table {
  Actors,
  Teams,
}

impl Table {
  fn probe_sql(self) -> &'static str {
    match self {
      Table::Actors => "SELECT 1 FROM actors WHERE actor_id = ?1",
      Table::Teams => "SELECT 1 FROM teams WHERE team_id = ?1",
    }
  }
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store: useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Close the connection. Clones still held elsewhere fail with
  /// [`Error::Database`] from then on.
  pub async fn close(self) -> Result<()> {
    self.conn.close().await?;
    Ok(())
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Whether the database holds no actors yet.
  pub async fn is_empty(&self) -> Result<bool> {
    let count: i64 = self
      .conn
      .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM actors", [], |r| r.get(0))?))
      .await?;
    Ok(count == 0)
  }

  /// Insert actors, teams and entities with their ids preserved. Used to seed
  /// an empty database with [`pdi_core::sample::SampleData`].
  pub async fn import(
    &self,
    actors: Vec<Actor>,
    teams: Vec<Team>,
    entities: Vec<OwnedEntity>,
  ) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Supervisors and teams are linked after every row exists.
        for a in &actors {
          tx.execute(
            "INSERT INTO actors (actor_id, name, email, role, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              encode_uuid(a.actor_id),
              a.name,
              a.email,
              a.role.as_str(),
              a.status.as_str(),
              encode_dt(a.created_at),
            ],
          )?;
        }
        for t in &teams {
          tx.execute(
            "INSERT INTO teams (team_id, name, leader_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![
              encode_uuid(t.team_id),
              t.name,
              encode_uuid(t.leader_id),
              encode_dt(t.created_at),
            ],
          )?;
        }
        for a in &actors {
          tx.execute(
            "UPDATE actors SET supervisor_id = ?2, team_id = ?3 WHERE actor_id = ?1",
            rusqlite::params![
              encode_uuid(a.actor_id),
              a.supervisor_id.map(encode_uuid),
              a.team_id.map(encode_uuid),
            ],
          )?;
        }
        for e in &entities {
          tx.execute(
            "INSERT INTO entities (
               entity_id, class, owner_id, secondary_actor_id, sensitivity,
               title, body, score, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              encode_uuid(e.entity_id),
              e.class.as_str(),
              encode_uuid(e.owner_id),
              e.secondary_actor_id.map(encode_uuid),
              e.sensitivity.as_str(),
              e.title,
              e.body,
              e.score,
              encode_dt(e.created_at),
              encode_dt(e.updated_at),
            ],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn exists(&self, table: Table, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let found = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(table.probe_sql(), rusqlite::params![id_str], |_| Ok(()))
            .optional()?
            .is_some(),
        )
      })
      .await?;
    Ok(found)
  }

  async fn require_actor(&self, id: Uuid) -> Result<()> {
    if self.exists(Table::Actors, id).await? {
      Ok(())
    } else {
      Err(pdi_core::Error::ActorNotFound(id).into())
    }
  }

  async fn require_team(&self, id: Uuid) -> Result<()> {
    if self.exists(Table::Teams, id).await? {
      Ok(())
    } else {
      Err(pdi_core::Error::TeamNotFound(id).into())
    }
  }

  async fn fetch_entity(&self, id: Uuid) -> Result<Option<OwnedEntity>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawEntityRow> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("{ENTITY_SELECT} WHERE e.entity_id = ?1"),
              rusqlite::params![id_str],
              RawEntityRow::from_row,
            )
            .optional()?,
        )
      })
      .await?;
    raw.map(RawEntityRow::into_entity).transpose()
  }

  async fn require_entity(&self, id: Uuid) -> Result<OwnedEntity> {
    self
      .fetch_entity(id)
      .await?
      .ok_or_else(|| pdi_core::Error::EntityNotFound(id).into())
  }
}

// ─── PeopleStore impl ────────────────────────────────────────────────────────

impl PeopleStore for SqliteStore {
  type Error = Error;

  // ── Actors ────────────────────────────────────────────────────────────────

  async fn add_actor(&self, input: NewActor) -> Result<Actor> {
    if let Some(supervisor_id) = input.supervisor_id {
      self.require_actor(supervisor_id).await?;
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

    let id_str         = encode_uuid(actor.actor_id);
    let name           = actor.name.clone();
    let email          = actor.email.clone();
    let role_str       = actor.role.as_str();
    let status_str     = actor.status.as_str();
    let supervisor_str = actor.supervisor_id.map(encode_uuid);
    let at_str         = encode_dt(actor.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO actors (actor_id, name, email, role, status, supervisor_id, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![id_str, name, email, role_str, status_str, supervisor_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(actor)
  }

  async fn get_actor(&self, id: Uuid) -> Result<Option<Actor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawActor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE actor_id = ?1"),
              rusqlite::params![id_str],
              RawActor::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawActor::into_actor).transpose()
  }

  async fn list_actors(&self) -> Result<Vec<Actor>> {
    let raws: Vec<RawActor> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare(&format!("SELECT {ACTOR_COLUMNS} FROM actors ORDER BY name"))?;
        let rows = stmt
          .query_map([], RawActor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActor::into_actor).collect()
  }

  async fn update_actor(&self, id: Uuid, patch: ActorPatch) -> Result<Actor> {
    if let Some(Some(supervisor_id)) = patch.supervisor_id {
      self.require_actor(supervisor_id).await?;
    }

    let id_str         = encode_uuid(id);
    let name           = patch.name;
    let role_str       = patch.role.map(Role::as_str);
    let status_str     = patch.status.map(ActorStatus::as_str);
    let set_supervisor = patch.supervisor_id.is_some();
    let supervisor_str = patch.supervisor_id.flatten().map(encode_uuid);

    // Only the patched columns are written, and the row is read back in the
    // same transaction, so concurrent patches to different fields all land.
    let raw: Option<RawActor> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let changed = tx.execute(
          "UPDATE actors
              SET name          = COALESCE(?2, name),
                  role          = COALESCE(?3, role),
                  status        = COALESCE(?4, status),
                  supervisor_id = CASE WHEN ?5 THEN ?6 ELSE supervisor_id END
            WHERE actor_id = ?1",
          rusqlite::params![id_str, name, role_str, status_str, set_supervisor, supervisor_str],
        )?;
        let raw = if changed == 0 {
          None
        } else {
          Some(tx.query_row(
            &format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE actor_id = ?1"),
            rusqlite::params![id_str],
            RawActor::from_row,
          )?)
        };
        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.ok_or(pdi_core::Error::ActorNotFound(id))?.into_actor()
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  async fn add_team(&self, input: NewTeam) -> Result<Team> {
    self.require_actor(input.leader_id).await?;

    let team = Team {
      team_id:    Uuid::new_v4(),
      name:       input.name,
      leader_id:  input.leader_id,
      member_ids: Vec::new(),
      created_at: Utc::now(),
    };

    let id_str     = encode_uuid(team.team_id);
    let name       = team.name.clone();
    let leader_str = encode_uuid(team.leader_id);
    let at_str     = encode_dt(team.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO teams (team_id, name, leader_id, created_at) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, leader_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(team)
  }

  async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTeam> = self
      .conn
      .call(move |conn| {
        let team = conn
          .query_row(
            "SELECT team_id, name, leader_id, created_at FROM teams WHERE team_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawTeam {
                team_id:    row.get(0)?,
                name:       row.get(1)?,
                leader_id:  row.get(2)?,
                created_at: row.get(3)?,
                member_ids: Vec::new(),
              })
            },
          )
          .optional()?;

        let Some(mut team) = team else { return Ok(None) };

        let mut stmt =
          conn.prepare("SELECT actor_id FROM actors WHERE team_id = ?1 ORDER BY name")?;
        team.member_ids = stmt
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(Some(team))
      })
      .await?;

    raw.map(RawTeam::into_team).transpose()
  }

  async fn list_teams(&self) -> Result<Vec<Team>> {
    let raws: Vec<RawTeam> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT team_id, name, leader_id, created_at FROM teams ORDER BY name")?;
        let mut teams = stmt
          .query_map([], |row| {
            Ok(RawTeam {
              team_id:    row.get(0)?,
              name:       row.get(1)?,
              leader_id:  row.get(2)?,
              created_at: row.get(3)?,
              member_ids: Vec::new(),
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut members =
          conn.prepare("SELECT actor_id FROM actors WHERE team_id = ?1 ORDER BY name")?;
        for team in &mut teams {
          team.member_ids = members
            .query_map(rusqlite::params![team.team_id], |r| r.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        }
        Ok(teams)
      })
      .await?;

    raws.into_iter().map(RawTeam::into_team).collect()
  }

  async fn assign_team(&self, actor_id: Uuid, team_id: Option<Uuid>) -> Result<Actor> {
    self.require_actor(actor_id).await?;
    if let Some(team_id) = team_id {
      self.require_team(team_id).await?;
    }

    let actor_str = encode_uuid(actor_id);
    let team_str  = team_id.map(encode_uuid);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE actors SET team_id = ?2 WHERE actor_id = ?1",
          rusqlite::params![actor_str, team_str],
        )?;
        Ok(())
      })
      .await?;

    self
      .get_actor(actor_id)
      .await?
      .ok_or_else(|| pdi_core::Error::ActorNotFound(actor_id).into())
  }

  // ── Owned entities ────────────────────────────────────────────────────────

  async fn add_entity(&self, input: NewEntity) -> Result<OwnedEntity> {
    self.require_actor(input.owner_id).await?;

    let entity_id       = Uuid::new_v4();
    let now             = Utc::now();
    let id_str          = encode_uuid(entity_id);
    let class_str       = input.class.as_str();
    let owner_str       = encode_uuid(input.owner_id);
    let secondary_str   = input.secondary_actor_id.map(encode_uuid);
    let sensitivity_str = input.resolved_sensitivity().as_str();
    let title           = input.title;
    let body            = input.body;
    let at_str          = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO entities (
             entity_id, class, owner_id, secondary_actor_id, sensitivity,
             title, body, score, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, NULL, ?8, ?8)",
          rusqlite::params![
            id_str,
            class_str,
            owner_str,
            secondary_str,
            sensitivity_str,
            title,
            body,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    self.require_entity(entity_id).await
  }

  async fn get_entity(&self, id: Uuid) -> Result<Option<OwnedEntity>> {
    self.fetch_entity(id).await
  }

  async fn list_entities<'a>(&'a self, query: &'a EntityQuery) -> Result<Vec<OwnedEntity>> {
    let class_str = query.class.map(|c| c.as_str());
    let owner_str = query.owner_id.map(encode_uuid);

    let raws: Vec<RawEntityRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "{ENTITY_SELECT}
            WHERE (?1 IS NULL OR e.class = ?1)
              AND (?2 IS NULL OR e.owner_id = ?2)
            ORDER BY e.created_at, e.entity_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params![class_str, owner_str], RawEntityRow::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntityRow::into_entity).collect()
  }

  async fn update_entity(&self, id: Uuid, patch: EntityPatch) -> Result<OwnedEntity> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE entities
              SET title      = COALESCE(?2, title),
                  body       = COALESCE(?3, body),
                  updated_at = ?4
            WHERE entity_id = ?1",
          rusqlite::params![id_str, patch.title, patch.body, at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(pdi_core::Error::EntityNotFound(id).into());
    }
    self.require_entity(id).await
  }

  async fn set_score(&self, id: Uuid, score: u8) -> Result<OwnedEntity> {
    let score = validate_score(score)?;
    self.require_entity(id).await?;

    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE entities SET score = ?2, updated_at = ?3 WHERE entity_id = ?1",
          rusqlite::params![id_str, score, at_str],
        )?;
        Ok(())
      })
      .await?;

    self.require_entity(id).await
  }

  async fn delete_entity(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM entities WHERE entity_id = ?1", rusqlite::params![id_str])?)
      })
      .await?;
    Ok(removed > 0)
  }
}
