//! Visibility policy evaluator.
//!
//! A pure, total decision function over `(actor, entity, operation)`. Rules
//! are tried in order and the first match wins:
//!
//! 1. `admin` may do anything.
//! 2. `rh` may do anything to HR records and HR tests.
//! 3. The owner may read and write its own records, except admin-only classes.
//! 4. A `gestor` may read, and evaluate, PDI objectives and assessments owned
//!    by a *direct* report. There is no recursion up the supervisor chain.
//! 5. Everything else is denied.
//!
//! Denial is a value, never an error. The data-access boundary decides whether
//! a denial becomes an empty result or a rejected write.

use serde::{Deserialize, Serialize};

use crate::{
  actor::{Actor, Roster},
  entity::{EntityClass, Owned},
  mask,
  role::Role,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
  Read,
  /// Edit the owner's own fields (title, description, self-assessment text).
  Write,
  /// Set a score or evaluation on someone else's record.
  Evaluate,
  Delete,
}

/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
  Admin,
  HrBlanket,
  Owner,
  DirectReport,
  AdminOnly,
  OwnerCannotEvaluate,
  OwnerCannotDelete,
  HierarchyReadOnly,
  NoRelation,
}

impl Reason {
  /// User-facing (pt-BR) message for a denial.
  pub fn message(self) -> &'static str {
    match self {
      Reason::Admin | Reason::HrBlanket | Reason::Owner | Reason::DirectReport => {
        "Operação permitida."
      }
      Reason::AdminOnly => "Apenas administradores podem realizar esta operação.",
      Reason::OwnerCannotEvaluate => "Você não pode avaliar o seu próprio registro.",
      Reason::OwnerCannotDelete => "Este registro não pode ser excluído pelo próprio colaborador.",
      Reason::HierarchyReadOnly => {
        "Gestores podem apenas visualizar e avaliar os registros da equipe."
      }
      Reason::NoRelation => "Você não tem permissão para acessar este registro.",
    }
  }
}

/// The outcome of a policy evaluation. Derived per request, never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityDecision {
  pub allow:  bool,
  pub reason: Reason,
  /// Whether the record's subject identity would be masked for this actor.
  pub masked: bool,
}

impl VisibilityDecision {
  fn allow(reason: Reason, masked: bool) -> Self { Self { allow: true, reason, masked } }

  fn deny(reason: Reason) -> Self { Self { allow: false, reason, masked: false } }
}

/// Decide whether `actor` may perform `op` on `entity`.
pub fn evaluate<E, R>(actor: &Actor, entity: &E, op: Operation, roster: &R) -> VisibilityDecision
where
  E: Owned + ?Sized,
  R: Roster + ?Sized,
{
  let class = entity.class();
  let masked = mask::requires_masking(actor, entity);

  if actor.role == Role::Admin {
    return VisibilityDecision::allow(Reason::Admin, masked);
  }

  if actor.role == Role::Rh && class.is_hr() {
    return VisibilityDecision::allow(Reason::HrBlanket, masked);
  }

  if class.is_admin_only() {
    return VisibilityDecision::deny(Reason::AdminOnly);
  }

  let owner_id = entity.owner_id();
  if !owner_id.is_nil() && owner_id == actor.actor_id {
    return match op {
      Operation::Read | Operation::Write => VisibilityDecision::allow(Reason::Owner, masked),
      Operation::Evaluate => VisibilityDecision::deny(Reason::OwnerCannotEvaluate),
      Operation::Delete if class == EntityClass::Comment => {
        VisibilityDecision::allow(Reason::Owner, masked)
      }
      Operation::Delete => VisibilityDecision::deny(Reason::OwnerCannotDelete),
    };
  }

  if actor.role == Role::Gestor
    && class.is_hierarchical()
    && roster.supervisor_of(owner_id) == Some(actor.actor_id)
  {
    return match op {
      Operation::Read | Operation::Evaluate => {
        VisibilityDecision::allow(Reason::DirectReport, masked)
      }
      Operation::Write | Operation::Delete => {
        VisibilityDecision::deny(Reason::HierarchyReadOnly)
      }
    };
  }

  VisibilityDecision::deny(Reason::NoRelation)
}

/// Shorthand for `evaluate(..).allow`.
pub fn is_allowed<E, R>(actor: &Actor, entity: &E, op: Operation, roster: &R) -> bool
where
  E: Owned + ?Sized,
  R: Roster + ?Sized,
{
  evaluate(actor, entity, op, roster).allow
}

/// The subset of `entities` `actor` may read, in input order.
pub fn filter_visible<E, R>(actor: &Actor, entities: Vec<E>, roster: &R) -> Vec<E>
where
  E: Owned,
  R: Roster + ?Sized,
{
  entities
    .into_iter()
    .filter(|e| is_allowed(actor, e, Operation::Read, roster))
    .collect()
}
