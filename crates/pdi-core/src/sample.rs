//! The static sample dataset served while the live source is unavailable.
//!
//! Everything here uses the same types as live data so callers cannot tell
//! the two apart by shape. Ids and timestamps are fixed so repeated loads are
//! identical.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  actor::Actor,
  entity::{EntityClass, OwnedEntity},
  role::{ActorStatus, Role},
  team::Team,
};

pub const ADMIN: Uuid = Uuid::from_u128(0x5a_0001);
pub const RH: Uuid = Uuid::from_u128(0x5a_0002);
pub const GESTOR_ENGENHARIA: Uuid = Uuid::from_u128(0x5a_0003);
pub const GESTOR_PRODUTO: Uuid = Uuid::from_u128(0x5a_0004);
pub const BRUNO: Uuid = Uuid::from_u128(0x5a_0005);
pub const CARLA: Uuid = Uuid::from_u128(0x5a_0006);
pub const DIEGO: Uuid = Uuid::from_u128(0x5a_0007);
pub const ELISA: Uuid = Uuid::from_u128(0x5a_0008);

pub const TEAM_ENGENHARIA: Uuid = Uuid::from_u128(0x5b_0001);
pub const TEAM_PRODUTO: Uuid = Uuid::from_u128(0x5b_0002);

pub const OBJECTIVE_BRUNO: Uuid = Uuid::from_u128(0x5c_0001);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleData {
  pub actors:   Vec<Actor>,
  pub teams:    Vec<Team>,
  pub entities: Vec<OwnedEntity>,
}

fn epoch() -> DateTime<Utc> {
  // 2024-01-15T09:00:00Z
  DateTime::from_timestamp(1_705_309_200, 0).unwrap_or_default()
}

fn actor(
  actor_id: Uuid,
  name: &str,
  role: Role,
  supervisor_id: Option<Uuid>,
  team_id: Option<Uuid>,
) -> Actor {
  let email = name
    .split_whitespace()
    .next()
    .unwrap_or(name)
    .to_lowercase();
  Actor {
    actor_id,
    name: name.to_owned(),
    email: format!("{email}@exemplo.com.br"),
    role,
    status: ActorStatus::Ativo,
    supervisor_id,
    team_id,
    created_at: epoch(),
  }
}

impl SampleData {
  pub fn load() -> Self {
    let actors = vec![
      actor(ADMIN, "Marina Costa", Role::Admin, None, None),
      actor(RH, "Paula Ribeiro", Role::Rh, None, None),
      actor(GESTOR_ENGENHARIA, "Rafael Lima", Role::Gestor, None, Some(TEAM_ENGENHARIA)),
      actor(GESTOR_PRODUTO, "Juliana Alves", Role::Gestor, None, Some(TEAM_PRODUTO)),
      actor(BRUNO, "Bruno Santos", Role::Colaborador, Some(GESTOR_ENGENHARIA), Some(TEAM_ENGENHARIA)),
      actor(CARLA, "Carla Souza", Role::Colaborador, Some(GESTOR_ENGENHARIA), Some(TEAM_ENGENHARIA)),
      actor(DIEGO, "Diego Martins", Role::Colaborador, Some(GESTOR_PRODUTO), Some(TEAM_PRODUTO)),
      actor(ELISA, "Elisa Rocha", Role::Colaborador, Some(GESTOR_PRODUTO), Some(TEAM_PRODUTO)),
    ];

    let teams: Vec<Team> = [
      (TEAM_ENGENHARIA, "Engenharia", GESTOR_ENGENHARIA),
      (TEAM_PRODUTO, "Produto", GESTOR_PRODUTO),
    ]
    .into_iter()
    .map(|(team_id, name, leader_id)| Team {
      team_id,
      name: name.to_owned(),
      leader_id,
      member_ids: actors
        .iter()
        .filter(|a| a.team_id == Some(team_id))
        .map(|a| a.actor_id)
        .collect(),
      created_at: epoch(),
    })
    .collect();

    let rows: [(u128, EntityClass, Uuid, Option<Uuid>, &str, Option<u8>); 11] = [
      (0x5c_0001, EntityClass::PdiObjective, BRUNO, Some(GESTOR_ENGENHARIA), "Dominar testes automatizados", None),
      (0x5c_0002, EntityClass::PdiObjective, CARLA, Some(GESTOR_ENGENHARIA), "Liderar a migração do serviço de pagamentos", None),
      (0x5c_0003, EntityClass::PdiObjective, DIEGO, Some(GESTOR_PRODUTO), "Conduzir entrevistas com clientes", None),
      (0x5c_0004, EntityClass::Assessment, BRUNO, Some(GESTOR_ENGENHARIA), "Comunicação", Some(4)),
      (0x5c_0005, EntityClass::Assessment, DIEGO, Some(GESTOR_PRODUTO), "Visão de produto", Some(3)),
      (0x5c_0006, EntityClass::HrRecord, CARLA, None, "Acompanhamento de bem-estar", None),
      (0x5c_0007, EntityClass::HrTest, ELISA, Some(RH), "Questionário de clima", None),
      (0x5c_0008, EntityClass::SalaryRecord, BRUNO, None, "Reajuste anual", None),
      (0x5c_0009, EntityClass::Achievement, DIEGO, None, "Primeiro PDI concluído", None),
      (0x5c_000a, EntityClass::Comment, GESTOR_ENGENHARIA, Some(OBJECTIVE_BRUNO), "Ótimo progresso neste trimestre", None),
      (0x5c_000b, EntityClass::CareerTrack, ADMIN, None, "Trilha de engenharia", None),
    ];

    let entities: Vec<OwnedEntity> = rows
      .into_iter()
      .map(|(id, class, owner_id, secondary_actor_id, title, score)| OwnedEntity {
        entity_id: Uuid::from_u128(id),
        class,
        owner_id,
        secondary_actor_id,
        sensitivity: class.default_sensitivity(),
        display_name: actors
          .iter()
          .find(|a| a.actor_id == owner_id)
          .map(|a| a.name.clone())
          .unwrap_or_default(),
        confidential: false,
        title: title.to_owned(),
        body: None,
        score,
        created_at: epoch(),
        updated_at: epoch(),
      })
      .collect();

    Self { actors, teams, entities }
  }
}
