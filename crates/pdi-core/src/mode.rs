//! Data-source mode: `Live` or `Degraded`.
//!
//! The controller is an explicit value shared by `Arc` between the store
//! wrapper that detects failures and whoever exposes the manual toggle. Once
//! degraded it stays degraded until [`ModeController::set_mode`] is called;
//! successful calls never move it back.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSourceMode {
  #[default]
  Live,
  Degraded,
}

#[derive(Debug, Default)]
pub struct ModeController {
  degraded: AtomicBool,
}

impl ModeController {
  pub fn new(initial: DataSourceMode) -> Self {
    Self { degraded: AtomicBool::new(initial == DataSourceMode::Degraded) }
  }

  pub fn mode(&self) -> DataSourceMode {
    if self.is_degraded() {
      DataSourceMode::Degraded
    } else {
      DataSourceMode::Live
    }
  }

  pub fn is_degraded(&self) -> bool { self.degraded.load(Ordering::SeqCst) }

  /// Note a failure of the live source. Returns `true` if this call moved the
  /// controller from `Live` to `Degraded`; failures while degraded are no-ops.
  pub fn record_failure(&self) -> bool { !self.degraded.swap(true, Ordering::SeqCst) }

  /// Manual toggle. Returns the previous mode.
  pub fn set_mode(&self, mode: DataSourceMode) -> DataSourceMode {
    let was = self.degraded.swap(mode == DataSourceMode::Degraded, Ordering::SeqCst);
    if was { DataSourceMode::Degraded } else { DataSourceMode::Live }
  }
}
