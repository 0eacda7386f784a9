// SPDX-License-Identifier: GPL-3.0-only
//! Relative adjustment logic
//!
//! Computes the value written by `set FEATURE N+` / `set FEATURE N-` from
//! the value currently reported by the display.

use serde::{Deserialize, Serialize};

use crate::invocation::MAX_VALUE;

/// What happens when a relative adjustment leaves 0..=100
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativePolicy {
    /// Clamp to the nearest bound and write it
    #[default]
    Clamp,
    /// Report the adjustment and skip the write
    Reject,
}

/// Applies relative adjustments under a bound policy
pub struct Adjuster {
    policy: RelativePolicy,
}

impl Adjuster {
    pub fn new(policy: RelativePolicy) -> Self {
        Self { policy }
    }

    /// Value to write for `current + delta`
    ///
    /// Returns `None` when the result leaves 0..=100 under
    /// [`RelativePolicy::Reject`].
    pub fn apply(&self, current: u16, delta: i32) -> Option<u16> {
        let target = i32::from(current) + delta;
        let max = i32::from(MAX_VALUE);

        if (0..=max).contains(&target) {
            return Some(target as u16);
        }

        match self.policy {
            RelativePolicy::Clamp => {
                let clamped = target.clamp(0, max) as u16;
                tracing::debug!(
                    current = %current,
                    delta = %delta,
                    clamped = %clamped,
                    "Clamping relative adjustment"
                );
                Some(clamped)
            }
            RelativePolicy::Reject => None,
        }
    }
}
