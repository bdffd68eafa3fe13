//! Handlers for `/mode`: inspect and toggle the data-source mode.
//!
//! Moving back to `live` is only ever done here; the store wrapper never
//! does it on its own.

use axum::{Json, extract::State};
use pdi_core::{entity::EntityClass, mode::DataSourceMode, policy::Operation, store::PeopleStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, CurrentActor, error::ApiError, guard};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ModeBody {
  pub mode: DataSourceMode,
}

/// `GET /mode`
pub async fn get<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(_): CurrentActor,
) -> Json<ModeBody> {
  Json(ModeBody { mode: state.mode.mode() })
}

/// `PUT /mode`: body: `{"mode":"live"}`; admin only.
pub async fn set<S: PeopleStore>(
  State(state): State<AppState<S>>,
  CurrentActor(actor): CurrentActor,
  Json(body): Json<ModeBody>,
) -> Result<Json<ModeBody>, ApiError> {
  guard::authorize_class(&actor, EntityClass::Settings, Operation::Write)?;
  let previous = state.mode.set_mode(body.mode);
  if previous != body.mode {
    tracing::warn!(by = %actor.actor_id, from = ?previous, to = ?body.mode, "data-source mode changed");
  }
  Ok(Json(body))
}
