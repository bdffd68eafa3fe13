//! [`ApiClient`]: session handling and typed calls for each endpoint.

use std::{sync::Arc, time::Duration};

use pdi_core::{
  actor::{Actor, ActorPatch, NewActor},
  entity::{EntityClass, EntityPatch, NewEntity, OwnedEntity},
  mode::DataSourceMode,
  mutation::Mutation,
  policy::Reason,
  team::{NewTeam, Team},
};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::watch;
use uuid::Uuid;

use crate::{EntityCache, Error, Result};

const ACTOR_HEADER: &str = "x-actor-id";

/// Connection settings for the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub base_url:      String,
  /// Upper bound on [`ApiClient::sign_in`]; a slow server must not leave the
  /// caller waiting indefinitely.
  pub login_timeout: Duration,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      base_url:      "http://127.0.0.1:8080".to_owned(),
      login_timeout: Duration::from_secs(10),
    }
  }
}

/// Error payload. `reason` carries a policy [`Reason`] or another
/// machine-readable code such as `"inactive"`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
  error:  String,
  #[serde(default)]
  reason: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ModeBody {
  mode: DataSourceMode,
}

#[derive(Serialize)]
struct EvaluateBody {
  score: u8,
}

/// Async HTTP client for the PDI JSON API.
///
/// Cheap to clone: clones share the HTTP connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
  client:  Client,
  config:  ClientConfig,
  session: Arc<watch::Sender<Option<Actor>>>,
}

impl ApiClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
    let (session, _) = watch::channel(None);
    Ok(Self { client, config, session: Arc::new(session) })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request_as(&self, method: Method, path: &str, actor_id: Uuid) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .header(ACTOR_HEADER, actor_id.to_string())
  }

  /// A request on behalf of the signed-in actor.
  fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
    let actor_id = self
      .session
      .borrow()
      .as_ref()
      .map(|a| a.actor_id)
      .ok_or(Error::NotSignedIn)?;
    Ok(self.request_as(method, path, actor_id))
  }

  async fn send<T: DeserializeOwned>(req: RequestBuilder) -> Result<T> {
    let resp = Self::check(req.send().await?).await?;
    Ok(resp.json().await?)
  }

  async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let text = resp.text().await.unwrap_or_default();
    let (message, code) = match serde_json::from_str::<ErrorBody>(&text) {
      Ok(body) => (body.error, body.reason),
      Err(_) => (text, None),
    };
    let reason = code
      .as_deref()
      .and_then(|c| serde_json::from_value::<Reason>(serde_json::Value::from(c)).ok());
    Err(Error::Rejected { status: status.as_u16(), message, code, reason })
  }

  // ── Session ───────────────────────────────────────────────────────────────

  /// Resolve `actor_id` against `GET /me` and make it the current session.
  ///
  /// Fails with [`Error::LoginTimeout`] if the server does not answer within
  /// the configured timeout; the session is left unchanged in that case.
  pub async fn sign_in(&self, actor_id: Uuid) -> Result<Actor> {
    let fetch = Self::send::<Actor>(self.request_as(Method::GET, "/me", actor_id));
    let actor = tokio::time::timeout(self.config.login_timeout, fetch)
      .await
      .map_err(|_| {
        tracing::warn!(%actor_id, timeout = ?self.config.login_timeout, "sign-in timed out");
        Error::LoginTimeout(self.config.login_timeout)
      })??;

    tracing::info!(%actor_id, role = %actor.role, "signed in");
    self.session.send_replace(Some(actor.clone()));
    Ok(actor)
  }

  pub fn sign_out(&self) {
    if self.session.send_replace(None).is_some() {
      tracing::info!("signed out");
    }
  }

  pub fn current_actor(&self) -> Option<Actor> { self.session.borrow().clone() }

  /// Notified on every sign-in and sign-out.
  pub fn on_session_change(&self) -> watch::Receiver<Option<Actor>> { self.session.subscribe() }

  // ── Actors ────────────────────────────────────────────────────────────────

  /// `GET /me`: the signed-in actor as the server currently sees it.
  pub async fn me(&self) -> Result<Actor> { Self::send(self.request(Method::GET, "/me")?).await }

  /// `GET /actors`
  pub async fn list_actors(&self) -> Result<Vec<Actor>> {
    Self::send(self.request(Method::GET, "/actors")?).await
  }

  /// `GET /actors/:id`
  pub async fn get_actor(&self, id: Uuid) -> Result<Actor> {
    Self::send(self.request(Method::GET, &format!("/actors/{id}"))?).await
  }

  /// `POST /actors`
  pub async fn create_actor(&self, input: &NewActor) -> Result<Actor> {
    Self::send(self.request(Method::POST, "/actors")?.json(input)).await
  }

  /// `PATCH /actors/:id`
  pub async fn update_actor(&self, id: Uuid, patch: &ActorPatch) -> Result<Actor> {
    Self::send(self.request(Method::PATCH, &format!("/actors/{id}"))?.json(patch)).await
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  /// `GET /teams`
  pub async fn list_teams(&self) -> Result<Vec<Team>> {
    Self::send(self.request(Method::GET, "/teams")?).await
  }

  /// `POST /teams`
  pub async fn create_team(&self, input: &NewTeam) -> Result<Team> {
    Self::send(self.request(Method::POST, "/teams")?.json(input)).await
  }

  /// `PUT /teams/:id/members/:actor_id`; returns the updated member.
  pub async fn add_team_member(&self, team_id: Uuid, actor_id: Uuid) -> Result<Actor> {
    let path = format!("/teams/{team_id}/members/{actor_id}");
    Self::send(self.request(Method::PUT, &path)?).await
  }

  /// `DELETE /teams/:id/members/:actor_id`; returns the former member.
  pub async fn remove_team_member(&self, team_id: Uuid, actor_id: Uuid) -> Result<Actor> {
    let path = format!("/teams/{team_id}/members/{actor_id}");
    Self::send(self.request(Method::DELETE, &path)?).await
  }

  // ── Entities ──────────────────────────────────────────────────────────────

  /// `GET /entities[?class=..][&owner_id=..]`
  pub async fn list_entities(
    &self,
    class: Option<EntityClass>,
    owner_id: Option<Uuid>,
  ) -> Result<Vec<OwnedEntity>> {
    let mut query = Vec::new();
    if let Some(class) = class {
      query.push(("class", class.as_str().to_owned()));
    }
    if let Some(owner_id) = owner_id {
      query.push(("owner_id", owner_id.to_string()));
    }
    Self::send(self.request(Method::GET, "/entities")?.query(&query)).await
  }

  /// `GET /entities/:id`
  pub async fn get_entity(&self, id: Uuid) -> Result<OwnedEntity> {
    Self::send(self.request(Method::GET, &format!("/entities/{id}"))?).await
  }

  /// `POST /entities`
  pub async fn create_entity(&self, input: &NewEntity) -> Result<OwnedEntity> {
    Self::send(self.request(Method::POST, "/entities")?.json(input)).await
  }

  /// `PATCH /entities/:id`
  pub async fn update_entity(&self, id: Uuid, patch: &EntityPatch) -> Result<OwnedEntity> {
    Self::send(self.request(Method::PATCH, &format!("/entities/{id}"))?.json(patch)).await
  }

  /// `POST /entities/:id/evaluate`
  pub async fn evaluate(&self, id: Uuid, score: u8) -> Result<OwnedEntity> {
    let req = self
      .request(Method::POST, &format!("/entities/{id}/evaluate"))?
      .json(&EvaluateBody { score });
    Self::send(req).await
  }

  /// `DELETE /entities/:id`
  pub async fn delete_entity(&self, id: Uuid) -> Result<()> {
    let req = self.request(Method::DELETE, &format!("/entities/{id}"))?;
    Self::check(req.send().await?).await?;
    Ok(())
  }

  /// Apply `patch` to the cached copy of `id` at once, then send it.
  ///
  /// On success the cache holds the server's version of the record; on
  /// failure the previous version is restored and the error returned.
  pub async fn update_entity_optimistic(
    &self,
    cache: &EntityCache,
    id: Uuid,
    patch: EntityPatch,
  ) -> Result<OwnedEntity> {
    let previous = cache
      .get(id)
      .await
      .ok_or(pdi_core::Error::EntityNotFound(id))?;
    let mut proposed = previous.clone();
    patch.apply(&mut proposed);

    let mut mutation = Mutation::begin(previous, proposed);
    cache.insert(mutation.proposed().clone()).await;

    match self.update_entity(id, &patch).await {
      Ok(confirmed) => {
        let confirmed = mutation.commit(confirmed)?;
        cache.insert(confirmed.clone()).await;
        Ok(confirmed)
      }
      Err(e) => {
        tracing::debug!(entity_id = %id, error = %e, "rolling back optimistic edit");
        cache.insert(mutation.fail()?).await;
        Err(e)
      }
    }
  }

  // ── Mode ──────────────────────────────────────────────────────────────────

  /// `GET /mode`
  pub async fn mode(&self) -> Result<DataSourceMode> {
    let body: ModeBody = Self::send(self.request(Method::GET, "/mode")?).await?;
    Ok(body.mode)
  }

  /// `PUT /mode`
  pub async fn set_mode(&self, mode: DataSourceMode) -> Result<DataSourceMode> {
    let req = self.request(Method::PUT, "/mode")?.json(&ModeBody { mode });
    let body: ModeBody = Self::send(req).await?;
    Ok(body.mode)
  }
}
