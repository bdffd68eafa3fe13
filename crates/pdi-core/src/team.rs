//! Teams. Membership is authoritative on the actor (`Actor::team_id`); the
//! `member_ids` list on a [`Team`] is derived from it at read time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{EntityClass, Owned};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub team_id:    Uuid,
  pub name:       String,
  pub leader_id:  Uuid,
  pub member_ids: Vec<Uuid>,
  pub created_at: DateTime<Utc>,
}

impl Owned for Team {
  fn class(&self) -> EntityClass { EntityClass::Team }

  fn owner_id(&self) -> Uuid { self.leader_id }
}

/// Input to [`crate::store::PeopleStore::add_team`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
  pub name:      String,
  pub leader_id: Uuid,
}

impl Owned for NewTeam {
  fn class(&self) -> EntityClass { EntityClass::Team }

  fn owner_id(&self) -> Uuid { self.leader_id }
}
