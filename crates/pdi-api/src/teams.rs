//! Handlers for `/teams` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/teams` | Any active actor |
//! | `POST`   | `/teams` | Body: [`NewTeam`]; admin, or the leader itself |
//! | `PUT`    | `/teams/:id/members/:actor_id` | Admin only; moves the actor into the team |
//! | `DELETE` | `/teams/:id/members/:actor_id` | Admin only; 404 if the actor is not in the team |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use pdi_core::{
  actor::Actor,
  entity::EntityClass,
  policy::Operation,
  store::PeopleStore,
  team::{NewTeam, Team},
};
use uuid::Uuid;

use crate::{AppState, CurrentActor, error::ApiError, guard};

/// `GET /teams`
pub async fn list<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(_): CurrentActor,
) -> Result<Json<Vec<Team>>, ApiError> {
  let teams = state.store.list_teams().await.map_err(ApiError::store)?;
  Ok(Json(teams))
}

/// `POST /teams`: returns 201 + the stored team.
pub async fn create<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<NewTeam>,
) -> Result<impl IntoResponse, ApiError> {
  if body.name.trim().is_empty() {
    return Err(ApiError::BadRequest("team name must not be empty".into()));
  }
  guard::authorize(&actor, &body, Operation::Write, guard::NOBODY)?;
  let team = state.store.add_team(body).await.map_err(ApiError::store)?;
  tracing::info!(by = %actor.actor_id, team_id = %team.team_id, "team created");
  Ok((StatusCode::CREATED, Json(team)))
}

/// `PUT /teams/:id/members/:actor_id`
pub async fn add_member<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Actor>, ApiError> {
  guard::authorize_class(&actor, EntityClass::RoleAssignment, Operation::Write)?;
  let member = state
    .store
    .assign_team(member_id, Some(team_id))
    .await
    .map_err(ApiError::store)?;
  tracing::info!(by = %actor.actor_id, %team_id, actor_id = %member_id, "team member added");
  Ok(Json(member))
}

/// `DELETE /teams/:id/members/:actor_id`
pub async fn remove_member<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Path((team_id, member_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Actor>, ApiError> {
  guard::authorize_class(&actor, EntityClass::RoleAssignment, Operation::Write)?;
  let current = state
    .store
    .get_actor(member_id)
    .await
    .map_err(ApiError::store)?;
  if current.is_none_or(|a| a.team_id != Some(team_id)) {
    return Err(ApiError::NotFound(format!("actor {member_id} is not in team {team_id}")));
  }
  let member = state
    .store
    .assign_team(member_id, None)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(by = %actor.actor_id, %team_id, actor_id = %member_id, "team member removed");
  Ok(Json(member))
}
