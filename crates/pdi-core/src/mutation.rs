//! Optimistic mutations with explicit pending / committed / failed states.
//!
//! A caller that updates local state before the write is confirmed keeps the
//! previous value in a [`Mutation`] so a failed write can be rolled back.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationState {
  Pending,
  Committed,
  Failed,
}

#[derive(Debug, Clone)]
pub struct Mutation<T> {
  previous: T,
  proposed: T,
  state:    MutationState,
}

impl<T: Clone> Mutation<T> {
  pub fn begin(previous: T, proposed: T) -> Self {
    Self { previous, proposed, state: MutationState::Pending }
  }

  pub fn state(&self) -> MutationState { self.state }

  /// The value to display while the write is in flight.
  pub fn proposed(&self) -> &T { &self.proposed }

  /// The write succeeded; returns the value the store confirmed.
  pub fn commit(&mut self, confirmed: T) -> Result<T> {
    self.settle(MutationState::Committed)?;
    self.proposed = confirmed;
    Ok(self.proposed.clone())
  }

  /// The write failed; returns the value to restore.
  pub fn fail(&mut self) -> Result<T> {
    self.settle(MutationState::Failed)?;
    Ok(self.previous.clone())
  }

  fn settle(&mut self, to: MutationState) -> Result<()> {
    if self.state != MutationState::Pending {
      return Err(Error::MutationSettled);
    }
    self.state = to;
    Ok(())
  }
}
