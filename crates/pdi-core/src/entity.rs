//! Owned entities and the entity ownership map.
//!
//! Every record the policy evaluator reasons about has an owning actor and,
//! for some classes, a secondary "supervisory" actor (mentor, evaluator). The
//! [`EntityClass`] methods below are the single place that declares which
//! storage attribute carries each of them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Entity class ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
  Profile,
  PdiObjective,
  Assessment,
  SalaryRecord,
  HrRecord,
  HrTest,
  Team,
  Achievement,
  Comment,
  RoleAssignment,
  CareerTrack,
  Settings,
}

impl EntityClass {
  pub const ALL: [EntityClass; 12] = [
    EntityClass::Profile,
    EntityClass::PdiObjective,
    EntityClass::Assessment,
    EntityClass::SalaryRecord,
    EntityClass::HrRecord,
    EntityClass::HrTest,
    EntityClass::Team,
    EntityClass::Achievement,
    EntityClass::Comment,
    EntityClass::RoleAssignment,
    EntityClass::CareerTrack,
    EntityClass::Settings,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Profile => "profile",
      Self::PdiObjective => "pdi_objective",
      Self::Assessment => "assessment",
      Self::SalaryRecord => "salary_record",
      Self::HrRecord => "hr_record",
      Self::HrTest => "hr_test",
      Self::Team => "team",
      Self::Achievement => "achievement",
      Self::Comment => "comment",
      Self::RoleAssignment => "role_assignment",
      Self::CareerTrack => "career_track",
      Self::Settings => "settings",
    }
  }

  /// The attribute naming the owning actor.
  pub fn owner_attribute(self) -> &'static str {
    match self {
      Self::Profile => "id",
      Self::PdiObjective | Self::Assessment | Self::HrRecord => "colaborador_id",
      Self::HrTest => "user_id",
      Self::SalaryRecord | Self::Achievement => "profile_id",
      Self::Comment => "author_id",
      Self::Team => "leader_id",
      Self::RoleAssignment | Self::CareerTrack | Self::Settings => "created_by",
    }
  }

  /// The optional secondary attribute naming a supervising actor.
  pub fn supervisory_attribute(self) -> Option<&'static str> {
    match self {
      Self::PdiObjective => Some("mentor_id"),
      Self::Assessment => Some("gestor_id"),
      Self::HrTest => Some("evaluator_id"),
      Self::Comment => Some("objective_id"),
      _ => None,
    }
  }

  /// Classes only an admin may touch; the owner rule does not apply to them.
  pub fn is_admin_only(self) -> bool {
    matches!(self, Self::RoleAssignment | Self::CareerTrack | Self::Settings)
  }

  /// Classes covered by the `rh` blanket grant.
  pub fn is_hr(self) -> bool { matches!(self, Self::HrRecord | Self::HrTest) }

  /// Classes a gestor can see for direct reports.
  pub fn is_hierarchical(self) -> bool {
    matches!(self, Self::PdiObjective | Self::Assessment)
  }

  pub fn default_sensitivity(self) -> Sensitivity {
    if self.is_hr() {
      Sensitivity::Confidential
    } else {
      Sensitivity::Normal
    }
  }
}

impl fmt::Display for EntityClass {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for EntityClass {
  type Err = Error;

  fn from_str(value: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|c| c.as_str() == value)
      .ok_or_else(|| Error::UnknownEntityClass(value.to_owned()))
  }
}

// ─── Sensitivity ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
  #[default]
  Normal,
  Confidential,
}

impl Sensitivity {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Normal => "normal",
      Self::Confidential => "confidential",
    }
  }

  /// Decode a stored sensitivity marker. Anything other than an explicit
  /// `"normal"` is treated as confidential.
  pub fn from_marker(marker: Option<&str>) -> Self {
    match marker {
      Some("normal") => Self::Normal,
      _ => Self::Confidential,
    }
  }

  pub fn is_confidential(self) -> bool { self == Self::Confidential }
}

// ─── Owned trait ─────────────────────────────────────────────────────────────

/// Anything the policy evaluator can make a decision about.
pub trait Owned {
  fn class(&self) -> EntityClass;
  fn owner_id(&self) -> Uuid;
  fn sensitivity(&self) -> Sensitivity { self.class().default_sensitivity() }
}

/// A stand-in for a record that does not exist yet (creation checks) or for
/// an operation on a class as a whole (settings, role assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
  pub class:    EntityClass,
  pub owner_id: Uuid,
}

impl Probe {
  pub fn new(class: EntityClass, owner_id: Uuid) -> Self { Self { class, owner_id } }

  /// A probe no actor owns; only role-level grants can match it.
  pub fn unowned(class: EntityClass) -> Self { Self::new(class, Uuid::nil()) }
}

impl Owned for Probe {
  fn class(&self) -> EntityClass { self.class }

  fn owner_id(&self) -> Uuid { self.owner_id }
}

impl Owned for crate::actor::Actor {
  fn class(&self) -> EntityClass { EntityClass::Profile }

  fn owner_id(&self) -> Uuid { self.actor_id }
}

// ─── OwnedEntity ─────────────────────────────────────────────────────────────

/// A record with a declared owning actor: PDI objectives, assessments, salary
/// records, HR records and tests, achievements, comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedEntity {
  pub entity_id:          Uuid,
  pub class:              EntityClass,
  /// The nil UUID marks an unknown owner; it never matches a real actor.
  pub owner_id:           Uuid,
  /// Mentor, evaluator, or parent record, depending on the class.
  pub secondary_actor_id: Option<Uuid>,
  pub sensitivity:        Sensitivity,
  /// Name of the subject as shown to the viewer; see [`crate::mask`].
  pub display_name:       String,
  /// Set by masking when `display_name` has been replaced.
  #[serde(default)]
  pub confidential:       bool,
  pub title:              String,
  pub body:               Option<String>,
  /// Evaluation score on a 1..=5 scale, set by the evaluator.
  pub score:              Option<u8>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl Owned for OwnedEntity {
  fn class(&self) -> EntityClass { self.class }

  fn owner_id(&self) -> Uuid { self.owner_id }

  fn sensitivity(&self) -> Sensitivity { self.sensitivity }
}

impl OwnedEntity {
  pub fn has_known_owner(&self) -> bool { !self.owner_id.is_nil() }
}

/// A loosely-shaped record as read from a datastore row or imported JSON.
///
/// Owner and sensitivity may be missing or malformed; conversion into an
/// [`OwnedEntity`] fails closed on both rather than rejecting the record.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntity {
  pub entity_id:          Uuid,
  pub class:              EntityClass,
  #[serde(default)]
  pub owner_id:           Option<String>,
  #[serde(default)]
  pub secondary_actor_id: Option<Uuid>,
  #[serde(default)]
  pub sensitivity:        Option<String>,
  #[serde(default)]
  pub display_name:       Option<String>,
  pub title:              String,
  #[serde(default)]
  pub body:               Option<String>,
  #[serde(default)]
  pub score:              Option<u8>,
  pub created_at:         DateTime<Utc>,
  pub updated_at:         DateTime<Utc>,
}

impl From<RawEntity> for OwnedEntity {
  fn from(raw: RawEntity) -> Self {
    let owner_id = raw
      .owner_id
      .as_deref()
      .and_then(|s| Uuid::parse_str(s).ok())
      .unwrap_or_else(Uuid::nil);

    let sensitivity = if owner_id.is_nil() {
      Sensitivity::Confidential
    } else {
      Sensitivity::from_marker(raw.sensitivity.as_deref())
    };

    Self {
      entity_id: raw.entity_id,
      class: raw.class,
      owner_id,
      secondary_actor_id: raw.secondary_actor_id,
      sensitivity,
      display_name: raw.display_name.unwrap_or_default(),
      confidential: false,
      title: raw.title,
      body: raw.body,
      score: raw.score,
      created_at: raw.created_at,
      updated_at: raw.updated_at,
    }
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PeopleStore::add_entity`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEntity {
  pub class:              EntityClass,
  pub owner_id:           Uuid,
  #[serde(default)]
  pub secondary_actor_id: Option<Uuid>,
  /// Defaults to the class's [`EntityClass::default_sensitivity`].
  #[serde(default)]
  pub sensitivity:        Option<Sensitivity>,
  pub title:              String,
  #[serde(default)]
  pub body:               Option<String>,
}

impl NewEntity {
  pub fn new(class: EntityClass, owner_id: Uuid, title: impl Into<String>) -> Self {
    Self {
      class,
      owner_id,
      secondary_actor_id: None,
      sensitivity: None,
      title: title.into(),
      body: None,
    }
  }

  pub fn resolved_sensitivity(&self) -> Sensitivity {
    self.sensitivity.unwrap_or_else(|| self.class.default_sensitivity())
  }
}

impl Owned for NewEntity {
  fn class(&self) -> EntityClass { self.class }

  fn owner_id(&self) -> Uuid { self.owner_id }

  fn sensitivity(&self) -> Sensitivity { self.resolved_sensitivity() }
}

/// Edits to the owner's text fields. Scores go through
/// [`crate::store::PeopleStore::set_score`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityPatch {
  pub title: Option<String>,
  pub body:  Option<String>,
}

impl EntityPatch {
  pub fn is_empty(&self) -> bool { self.title.is_none() && self.body.is_none() }

  pub fn apply(&self, entity: &mut OwnedEntity) {
    if let Some(title) = &self.title {
      entity.title = title.clone();
    }
    if let Some(body) = &self.body {
      entity.body = Some(body.clone());
    }
  }
}

pub const SCORE_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

pub fn validate_score(score: u8) -> Result<u8> {
  if SCORE_RANGE.contains(&score) {
    Ok(score)
  } else {
    Err(Error::ScoreOutOfRange(score))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn raw(owner_id: Option<&str>, sensitivity: Option<&str>) -> RawEntity {
    RawEntity {
      entity_id: Uuid::new_v4(),
      class: EntityClass::PdiObjective,
      owner_id: owner_id.map(str::to_owned),
      secondary_actor_id: None,
      sensitivity: sensitivity.map(str::to_owned),
      display_name: Some("Bruno".into()),
      title: "Aprender Rust".into(),
      body: None,
      score: None,
      created_at: Utc::now(),
      updated_at: Utc::now(),
    }
  }

  #[test]
  fn class_string_roundtrip() {
    for class in EntityClass::ALL {
      assert_eq!(class.as_str().parse::<EntityClass>().unwrap(), class);
      let json = serde_json::to_string(&class).unwrap();
      assert_eq!(json, format!("\"{}\"", class.as_str()));
    }
  }

  #[test]
  fn ownership_map() {
    assert_eq!(EntityClass::PdiObjective.owner_attribute(), "colaborador_id");
    assert_eq!(EntityClass::PdiObjective.supervisory_attribute(), Some("mentor_id"));
    assert_eq!(EntityClass::HrTest.owner_attribute(), "user_id");
    assert_eq!(EntityClass::SalaryRecord.supervisory_attribute(), None);
    assert!(EntityClass::CareerTrack.is_admin_only());
    assert!(!EntityClass::Profile.is_admin_only());
  }

  #[test]
  fn hr_classes_default_to_confidential() {
    assert_eq!(EntityClass::HrRecord.default_sensitivity(), Sensitivity::Confidential);
    assert_eq!(EntityClass::HrTest.default_sensitivity(), Sensitivity::Confidential);
    assert_eq!(EntityClass::Assessment.default_sensitivity(), Sensitivity::Normal);
  }

  #[test]
  fn unknown_sensitivity_fails_closed() {
    assert_eq!(Sensitivity::from_marker(None), Sensitivity::Confidential);
    assert_eq!(Sensitivity::from_marker(Some("secret")), Sensitivity::Confidential);
    assert_eq!(Sensitivity::from_marker(Some("normal")), Sensitivity::Normal);
  }

  #[test]
  fn raw_without_owner_becomes_unknown_and_confidential() {
    let entity = OwnedEntity::from(raw(None, Some("normal")));
    assert!(entity.owner_id.is_nil());
    assert!(!entity.has_known_owner());
    assert_eq!(entity.sensitivity, Sensitivity::Confidential);
  }

  #[test]
  fn raw_with_garbage_owner_fails_closed() {
    let entity = OwnedEntity::from(raw(Some("not-a-uuid"), Some("normal")));
    assert!(entity.owner_id.is_nil());
    assert_eq!(entity.sensitivity, Sensitivity::Confidential);
  }

  #[test]
  fn raw_with_owner_keeps_marker() {
    let owner = Uuid::new_v4();
    let entity = OwnedEntity::from(raw(Some(&owner.to_string()), Some("normal")));
    assert_eq!(entity.owner_id, owner);
    assert_eq!(entity.sensitivity, Sensitivity::Normal);
  }

  #[test]
  fn raw_deserialises_with_missing_fields() {
    let json = serde_json::json!({
      "entity_id": Uuid::new_v4(),
      "class": "hr_record",
      "title": "Registro",
      "created_at": "2024-01-15T09:00:00Z",
      "updated_at": "2024-01-15T09:00:00Z",
    });
    let raw: RawEntity = serde_json::from_value(json).unwrap();
    let entity = OwnedEntity::from(raw);
    assert!(entity.owner_id.is_nil());
    assert!(entity.sensitivity.is_confidential());
  }

  #[test]
  fn score_scale() {
    assert_eq!(validate_score(3), Ok(3));
    assert_eq!(validate_score(0), Err(Error::ScoreOutOfRange(0)));
    assert_eq!(validate_score(6), Err(Error::ScoreOutOfRange(6)));
  }
}
