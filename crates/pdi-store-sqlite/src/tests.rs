//! Integration tests for `SqliteStore` against an in-memory database.

use pdi_core::{
  actor::{ActorPatch, NewActor},
  entity::{EntityClass, EntityPatch, NewEntity, Sensitivity},
  role::{ActorStatus, Role},
  sample::{self, SampleData},
  store::{EntityQuery, PeopleStore, StoreError as _},
  team::NewTeam,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

// ─── Actors ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_actor() {
  let s = store().await;

  let actor = s
    .add_actor(NewActor::new("Ana Prado", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  assert_eq!(actor.status, ActorStatus::Ativo);

  let fetched = s.get_actor(actor.actor_id).await.unwrap().unwrap();
  assert_eq!(fetched, actor);
}

#[tokio::test]
async fn get_actor_missing_returns_none() {
  let s = store().await;
  assert!(s.get_actor(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn add_actor_with_unknown_supervisor_is_rejected() {
  let s = store().await;
  let ghost = Uuid::new_v4();
  let err = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador).reporting_to(ghost))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::ActorNotFound(id)) if id == ghost));
  assert!(!err.is_unavailable());
}

#[tokio::test]
async fn update_actor_changes_role_and_supervisor() {
  let s = store().await;
  let boss = s
    .add_actor(NewActor::new("Rafael", "rafael@example.com", Role::Gestor))
    .await
    .unwrap();
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();

  let updated = s
    .update_actor(ana.actor_id, ActorPatch {
      role: Some(Role::Gestor),
      supervisor_id: Some(Some(boss.actor_id)),
      ..ActorPatch::default()
    })
    .await
    .unwrap();
  assert_eq!(updated.role, Role::Gestor);
  assert_eq!(updated.supervisor_id, Some(boss.actor_id));

  let cleared = s
    .update_actor(ana.actor_id, ActorPatch {
      supervisor_id: Some(None),
      status: Some(ActorStatus::Inativo),
      ..ActorPatch::default()
    })
    .await
    .unwrap();
  assert_eq!(cleared.supervisor_id, None);
  assert_eq!(cleared.status, ActorStatus::Inativo);

  let fetched = s.get_actor(ana.actor_id).await.unwrap().unwrap();
  assert_eq!(fetched, cleared);
}

#[tokio::test]
async fn update_missing_actor_is_not_found() {
  let s = store().await;
  let err = s
    .update_actor(Uuid::new_v4(), ActorPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::ActorNotFound(_))));
}

// ─── Teams ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn team_members_follow_actor_back_reference() {
  let s = store().await;
  let lead = s
    .add_actor(NewActor::new("Rafael", "rafael@example.com", Role::Gestor))
    .await
    .unwrap();
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();

  let alpha = s
    .add_team(NewTeam { name: "Alpha".into(), leader_id: lead.actor_id })
    .await
    .unwrap();
  let beta = s
    .add_team(NewTeam { name: "Beta".into(), leader_id: lead.actor_id })
    .await
    .unwrap();

  s.assign_team(ana.actor_id, Some(alpha.team_id)).await.unwrap();
  let alpha_now = s.get_team(alpha.team_id).await.unwrap().unwrap();
  assert_eq!(alpha_now.member_ids, vec![ana.actor_id]);

  // Moving to another team removes the actor from the first one.
  let moved = s.assign_team(ana.actor_id, Some(beta.team_id)).await.unwrap();
  assert_eq!(moved.team_id, Some(beta.team_id));
  let teams = s.list_teams().await.unwrap();
  let alpha_now = teams.iter().find(|t| t.team_id == alpha.team_id).unwrap();
  let beta_now = teams.iter().find(|t| t.team_id == beta.team_id).unwrap();
  assert!(alpha_now.member_ids.is_empty());
  assert_eq!(beta_now.member_ids, vec![ana.actor_id]);
}

#[tokio::test]
async fn assign_to_unknown_team_is_rejected() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  let err = s.assign_team(ana.actor_id, Some(Uuid::new_v4())).await.unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::TeamNotFound(_))));
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_entity_resolves_display_name_and_sensitivity() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana Prado", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();

  let record = s
    .add_entity(NewEntity::new(EntityClass::HrRecord, ana.actor_id, "Conversa"))
    .await
    .unwrap();
  assert_eq!(record.display_name, "Ana Prado");
  assert_eq!(record.sensitivity, Sensitivity::Confidential);
  assert!(!record.confidential);

  let objective = s
    .add_entity(NewEntity::new(EntityClass::PdiObjective, ana.actor_id, "Aprender Rust"))
    .await
    .unwrap();
  assert_eq!(objective.sensitivity, Sensitivity::Normal);
}

#[tokio::test]
async fn add_entity_for_unknown_owner_is_rejected() {
  let s = store().await;
  let err = s
    .add_entity(NewEntity::new(EntityClass::PdiObjective, Uuid::new_v4(), "Órfão"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::ActorNotFound(_))));
}

#[tokio::test]
async fn list_entities_filters_by_class_and_owner() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  let bia = s
    .add_actor(NewActor::new("Bia", "bia@example.com", Role::Colaborador))
    .await
    .unwrap();

  for (class, owner) in [
    (EntityClass::PdiObjective, ana.actor_id),
    (EntityClass::PdiObjective, bia.actor_id),
    (EntityClass::Assessment, ana.actor_id),
  ] {
    s.add_entity(NewEntity::new(class, owner, "x")).await.unwrap();
  }

  let all = s.list_entities(&EntityQuery::default()).await.unwrap();
  assert_eq!(all.len(), 3);

  let objectives = s
    .list_entities(&EntityQuery::class(EntityClass::PdiObjective))
    .await
    .unwrap();
  assert_eq!(objectives.len(), 2);

  let anas = s
    .list_entities(&EntityQuery { class: None, owner_id: Some(ana.actor_id) })
    .await
    .unwrap();
  assert_eq!(anas.len(), 2);
  assert!(anas.iter().all(|e| e.owner_id == ana.actor_id));
}

#[tokio::test]
async fn update_score_and_delete_entity() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  let e = s
    .add_entity(NewEntity::new(EntityClass::Assessment, ana.actor_id, "Comunicação"))
    .await
    .unwrap();

  let edited = s
    .update_entity(e.entity_id, EntityPatch {
      title: None,
      body: Some("Autoavaliação".into()),
    })
    .await
    .unwrap();
  assert_eq!(edited.title, "Comunicação");
  assert_eq!(edited.body.as_deref(), Some("Autoavaliação"));

  let scored = s.set_score(e.entity_id, 4).await.unwrap();
  assert_eq!(scored.score, Some(4));

  let err = s.set_score(e.entity_id, 9).await.unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::ScoreOutOfRange(9))));

  assert!(s.delete_entity(e.entity_id).await.unwrap());
  assert!(!s.delete_entity(e.entity_id).await.unwrap());
  assert!(s.get_entity(e.entity_id).await.unwrap().is_none());
}

#[tokio::test]
async fn update_missing_entity_is_not_found() {
  let s = store().await;
  let err = s
    .update_entity(Uuid::new_v4(), EntityPatch::default())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(pdi_core::Error::EntityNotFound(_))));
}

// ─── Concurrent patches ──────────────────────────────────────────────────────

#[tokio::test]
async fn concurrent_actor_patches_keep_every_field() {
  let s = store().await;
  for i in 0..20 {
    let actor = s
      .add_actor(NewActor::new(format!("Ana {i}"), "ana@example.com", Role::Colaborador))
      .await
      .unwrap();
    let (promoted, deactivated) = tokio::join!(
      s.update_actor(actor.actor_id, ActorPatch {
        role: Some(Role::Gestor),
        ..Default::default()
      }),
      s.update_actor(actor.actor_id, ActorPatch {
        status: Some(ActorStatus::Inativo),
        ..Default::default()
      }),
    );
    promoted.unwrap();
    deactivated.unwrap();

    let stored = s.get_actor(actor.actor_id).await.unwrap().unwrap();
    assert_eq!(stored.role, Role::Gestor);
    assert_eq!(stored.status, ActorStatus::Inativo);
    assert_eq!(stored.name, format!("Ana {i}"));
  }
}

#[tokio::test]
async fn concurrent_entity_patches_keep_every_field() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  for _ in 0..20 {
    let e = s
      .add_entity(NewEntity::new(EntityClass::PdiObjective, ana.actor_id, "Rascunho"))
      .await
      .unwrap();
    let (titled, described) = tokio::join!(
      s.update_entity(e.entity_id, EntityPatch {
        title: Some("Aprender Rust".into()),
        body:  None,
      }),
      s.update_entity(e.entity_id, EntityPatch {
        title: None,
        body:  Some("Concluir o livro".into()),
      }),
    );
    titled.unwrap();
    described.unwrap();

    let stored = s.get_entity(e.entity_id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Aprender Rust");
    assert_eq!(stored.body.as_deref(), Some("Concluir o livro"));
  }
}

#[tokio::test]
async fn clearing_supervisor_leaves_other_fields() {
  let s = store().await;
  let boss = s
    .add_actor(NewActor::new("Rafael", "rafael@example.com", Role::Gestor))
    .await
    .unwrap();
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador).reporting_to(boss.actor_id))
    .await
    .unwrap();

  let renamed = s
    .update_actor(ana.actor_id, ActorPatch { name: Some("Ana Prado".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(renamed.supervisor_id, Some(boss.actor_id));

  let cleared = s
    .update_actor(ana.actor_id, ActorPatch { supervisor_id: Some(None), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(cleared.supervisor_id, None);
  assert_eq!(cleared.name, "Ana Prado");
  assert_eq!(cleared.role, Role::Colaborador);
}

// ─── Corrupt rows ────────────────────────────────────────────────────────────

/// Overwrite a column behind the store's back.
async fn corrupt(s: &SqliteStore, sql: &'static str, id: Uuid) {
  let id = id.hyphenated().to_string();
  s.conn
    .call(move |conn| {
      conn.execute(sql, rusqlite::params![id])?;
      Ok(())
    })
    .await
    .unwrap();
}

fn is_corrupt(err: &Error) -> bool {
  matches!(err, Error::Core(pdi_core::Error::CorruptRecord(_)))
}

#[tokio::test]
async fn undecodable_actor_is_a_domain_error() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  corrupt(&s, "UPDATE actors SET role = 'chefe' WHERE actor_id = ?1", ana.actor_id).await;

  let err = s.get_actor(ana.actor_id).await.unwrap_err();
  assert!(is_corrupt(&err), "{err:?}");
  assert!(!err.is_unavailable());

  let err = s.list_actors().await.unwrap_err();
  assert!(is_corrupt(&err));
}

#[tokio::test]
async fn undecodable_entity_is_a_domain_error() {
  let s = store().await;
  let ana = s
    .add_actor(NewActor::new("Ana", "ana@example.com", Role::Colaborador))
    .await
    .unwrap();
  let e = s
    .add_entity(NewEntity::new(EntityClass::Achievement, ana.actor_id, "Palestra"))
    .await
    .unwrap();
  corrupt(&s, "UPDATE entities SET created_at = 'ontem' WHERE entity_id = ?1", e.entity_id).await;

  let err = s.get_entity(e.entity_id).await.unwrap_err();
  assert!(is_corrupt(&err), "{err:?}");
  assert!(!err.is_unavailable());
}

#[tokio::test]
async fn closed_connection_is_unavailable() {
  let s = store().await;
  let other = s.clone();
  s.close().await.unwrap();

  let err = other.list_actors().await.unwrap_err();
  assert!(matches!(err, Error::Database(_)));
  assert!(err.is_unavailable());
}

// ─── Import ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn sample_import_roundtrips() {
  let s = store().await;
  assert!(s.is_empty().await.unwrap());

  let data = SampleData::load();
  s.import(data.actors.clone(), data.teams.clone(), data.entities.clone())
    .await
    .unwrap();
  assert!(!s.is_empty().await.unwrap());

  let bruno = s.get_actor(sample::BRUNO).await.unwrap().unwrap();
  assert_eq!(bruno.supervisor_id, Some(sample::GESTOR_ENGENHARIA));
  assert_eq!(bruno.team_id, Some(sample::TEAM_ENGENHARIA));

  let entities = s.list_entities(&EntityQuery::default()).await.unwrap();
  assert_eq!(entities.len(), data.entities.len());

  let team = s.get_team(sample::TEAM_ENGENHARIA).await.unwrap().unwrap();
  assert_eq!(team.member_ids.len(), 3);
}
