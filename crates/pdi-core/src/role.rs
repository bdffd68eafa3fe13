//! Role registry.
//!
//! Roles are a flat enumeration. There is no hierarchy object: how roles relate
//! to each other is expressed by the rules in [`crate::policy`].

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
  Admin,
  Gestor,
  Colaborador,
  Rh,
}

impl Role {
  pub const ALL: [Role; 4] = [Role::Admin, Role::Gestor, Role::Colaborador, Role::Rh];

  pub fn as_str(self) -> &'static str {
    match self {
      Role::Admin => "admin",
      Role::Gestor => "gestor",
      Role::Colaborador => "colaborador",
      Role::Rh => "rh",
    }
  }
}

impl fmt::Display for Role {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Role {
  type Err = Error;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "admin" => Ok(Role::Admin),
      "gestor" => Ok(Role::Gestor),
      "colaborador" => Ok(Role::Colaborador),
      "rh" => Ok(Role::Rh),
      other => Err(Error::UnknownRole(other.to_owned())),
    }
  }
}

/// Account status. Actors are never hard-deleted; deactivation flips this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorStatus {
  #[default]
  Ativo,
  Inativo,
}

impl ActorStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      ActorStatus::Ativo => "ativo",
      ActorStatus::Inativo => "inativo",
    }
  }
}

impl FromStr for ActorStatus {
  type Err = Error;

  fn from_str(value: &str) -> Result<Self, Self::Err> {
    match value {
      "ativo" => Ok(ActorStatus::Ativo),
      "inativo" => Ok(ActorStatus::Inativo),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }
}
