//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. UUIDs are stored as
//! hyphenated lowercase strings. Enums are stored as their serde names. A
//! column that does not decode is reported as
//! [`pdi_core::Error::CorruptRecord`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use pdi_core::{
  actor::Actor,
  entity::{EntityClass, OwnedEntity, RawEntity},
  role::{ActorStatus, Role},
  team::Team,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::corrupt(format_args!("uuid {s:?}: {e}")))
}

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::corrupt(format_args!("timestamp {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::corrupt(format_args!("{column} {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `actors` row.
pub struct RawActor {
  pub actor_id:      String,
  pub name:          String,
  pub email:         String,
  pub role:          String,
  pub status:        String,
  pub supervisor_id: Option<String>,
  pub team_id:       Option<String>,
  pub created_at:    String,
}

pub const ACTOR_COLUMNS: &str =
  "actor_id, name, email, role, status, supervisor_id, team_id, created_at";

impl RawActor {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      actor_id:      row.get(0)?,
      name:          row.get(1)?,
      email:         row.get(2)?,
      role:          row.get(3)?,
      status:        row.get(4)?,
      supervisor_id: row.get(5)?,
      team_id:       row.get(6)?,
      created_at:    row.get(7)?,
    })
  }

  pub fn into_actor(self) -> Result<Actor> {
    Ok(Actor {
      actor_id:      decode_uuid(&self.actor_id)?,
      name:          self.name,
      email:         self.email,
      role:          decode_enum::<Role>("role", &self.role)?,
      status:        decode_enum::<ActorStatus>("status", &self.status)?,
      supervisor_id: decode_opt_uuid(self.supervisor_id)?,
      team_id:       decode_opt_uuid(self.team_id)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `teams` row plus its derived members.
pub struct RawTeam {
  pub team_id:    String,
  pub name:       String,
  pub leader_id:  String,
  pub created_at: String,
  pub member_ids: Vec<String>,
}

impl RawTeam {
  pub fn into_team(self) -> Result<Team> {
    Ok(Team {
      team_id:    decode_uuid(&self.team_id)?,
      name:       self.name,
      leader_id:  decode_uuid(&self.leader_id)?,
      member_ids: self
        .member_ids
        .iter()
        .map(|s| decode_uuid(s))
        .collect::<Result<_>>()?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read from an `entities` row left-joined with its owner.
pub struct RawEntityRow {
  pub entity_id:          String,
  pub class:              String,
  pub owner_id:           Option<String>,
  pub secondary_actor_id: Option<String>,
  pub sensitivity:        Option<String>,
  pub title:              String,
  pub body:               Option<String>,
  pub score:              Option<i64>,
  pub created_at:         String,
  pub updated_at:         String,
  // actors join
  pub owner_name:         Option<String>,
}

pub const ENTITY_SELECT: &str = "
  SELECT e.entity_id, e.class, e.owner_id, e.secondary_actor_id, e.sensitivity,
         e.title, e.body, e.score, e.created_at, e.updated_at, a.name
    FROM entities e
    LEFT JOIN actors a ON a.actor_id = e.owner_id";

impl RawEntityRow {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entity_id:          row.get(0)?,
      class:              row.get(1)?,
      owner_id:           row.get(2)?,
      secondary_actor_id: row.get(3)?,
      sensitivity:        row.get(4)?,
      title:              row.get(5)?,
      body:               row.get(6)?,
      score:              row.get(7)?,
      created_at:         row.get(8)?,
      updated_at:         row.get(9)?,
      owner_name:         row.get(10)?,
    })
  }

  /// Decode through [`RawEntity`] so a malformed owner or sensitivity marker
  /// fails closed instead of failing the read.
  pub fn into_entity(self) -> Result<OwnedEntity> {
    let score = self
      .score
      .map(|s| u8::try_from(s).map_err(|_| Error::corrupt(format_args!("score {s}"))))
      .transpose()?;

    let raw = RawEntity {
      entity_id:          decode_uuid(&self.entity_id)?,
      class:              decode_enum::<EntityClass>("class", &self.class)?,
      owner_id:           self.owner_id,
      secondary_actor_id: decode_opt_uuid(self.secondary_actor_id)?,
      sensitivity:        self.sensitivity,
      display_name:       self.owner_name,
      title:              self.title,
      body:               self.body,
      score,
      created_at:         decode_dt(&self.created_at)?,
      updated_at:         decode_dt(&self.updated_at)?,
    };
    Ok(OwnedEntity::from(raw))
  }
}

#[cfg(test)]
mod tests {
  use pdi_core::store::StoreError as _;

  use super::*;

  fn row(owner_id: Option<&str>, sensitivity: Option<&str>) -> RawEntityRow {
    RawEntityRow {
      entity_id:          Uuid::new_v4().to_string(),
      class:              "hr_record".into(),
      owner_id:           owner_id.map(str::to_owned),
      secondary_actor_id: None,
      sensitivity:        sensitivity.map(str::to_owned),
      title:              "Registro".into(),
      body:               None,
      score:              None,
      created_at:         "2024-01-15T09:00:00+00:00".into(),
      updated_at:         "2024-01-15T09:00:00+00:00".into(),
      owner_name:         Some("Carla".into()),
    }
  }

  #[test]
  fn dt_roundtrip() {
    let now = Utc::now();
    assert_eq!(decode_dt(&encode_dt(now)).unwrap(), now);
  }

  #[test]
  fn corrupt_owner_decodes_as_unknown() {
    let e = row(Some("???"), Some("normal")).into_entity().unwrap();
    assert!(e.owner_id.is_nil());
    assert!(e.sensitivity.is_confidential());
  }

  #[test]
  fn unknown_sensitivity_decodes_as_confidential() {
    let owner = Uuid::new_v4().to_string();
    let e = row(Some(&owner), Some("restricted")).into_entity().unwrap();
    assert!(e.sensitivity.is_confidential());
    assert_eq!(e.display_name, "Carla");
  }

  fn is_corrupt<T>(r: &Result<T>) -> bool {
    matches!(r, Err(Error::Core(pdi_core::Error::CorruptRecord(_))))
  }

  #[test]
  fn unknown_class_is_a_corrupt_record() {
    let mut r = row(None, None);
    r.class = "spaceship".into();
    let res = r.into_entity();
    assert!(is_corrupt(&res), "{res:?}");
    assert!(!res.unwrap_err().is_unavailable());
  }

  #[test]
  fn bad_timestamps_and_ids_are_corrupt_records() {
    let mut r = row(None, None);
    r.updated_at = "ontem".into();
    assert!(is_corrupt(&r.into_entity()));

    let mut r = row(None, None);
    r.entity_id = "not-a-uuid".into();
    assert!(is_corrupt(&r.into_entity()));

    let mut r = row(None, None);
    r.score = Some(-1);
    assert!(is_corrupt(&r.into_entity()));
  }

  #[test]
  fn unknown_role_or_status_is_a_corrupt_record() {
    let actor = || RawActor {
      actor_id:      Uuid::new_v4().to_string(),
      name:          "Bruno".into(),
      email:         "bruno@exemplo.com.br".into(),
      role:          "colaborador".into(),
      status:        "ativo".into(),
      supervisor_id: None,
      team_id:       None,
      created_at:    "2024-01-15T09:00:00+00:00".into(),
    };
    assert!(actor().into_actor().is_ok());

    let mut raw = actor();
    raw.role = "chefe".into();
    assert!(is_corrupt(&raw.into_actor()));

    let mut raw = actor();
    raw.status = "suspenso".into();
    assert!(is_corrupt(&raw.into_actor()));
  }
}
