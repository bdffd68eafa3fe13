use std::time::Duration;

use pdi_core::policy::Reason;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("sign-in did not complete within {0:?}")]
  LoginTimeout(Duration),

  #[error("not signed in")]
  NotSignedIn,

  /// The server answered with a non-success status.
  #[error("{status}: {message}")]
  Rejected {
    status:  u16,
    message: String,
    /// Machine-readable code from the error body, if any.
    code:    Option<String>,
    /// Set when the visibility policy denied the request.
    reason:  Option<Reason>,
  },

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error(transparent)]
  Core(#[from] pdi_core::Error),
}

impl Error {
  /// The policy denial behind this error, if any.
  pub fn reason(&self) -> Option<Reason> {
    match self {
      Error::Rejected { reason, .. } => *reason,
      _ => None,
    }
  }

  /// Whether the server refused the actor for being deactivated.
  pub fn is_inactive(&self) -> bool {
    matches!(self, Error::Rejected { code: Some(code), .. } if code == "inactive")
  }

  pub fn status(&self) -> Option<u16> {
    match self {
      Error::Rejected { status, .. } => Some(*status),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
