// SPDX-License-Identifier: GPL-3.0-only
//! Display control protocols
//!
//! The dispatcher only talks to displays through [`DisplayController`], so
//! the DDC/CI backend can be swapped for a simulated one in tests.

pub mod ddc_ci;

#[cfg(test)]
pub mod simulated;

use anyhow::Result;
use thiserror::Error;

use crate::invocation::Feature;

/// Non-table VCP value as a high/low byte pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VcpValue {
    pub sh: u8,
    pub sl: u8,
}

impl VcpValue {
    pub fn from_value(value: u16) -> Self {
        Self {
            sh: (value >> 8) as u8,
            sl: (value & 0xff) as u8,
        }
    }

    pub fn value(self) -> u16 {
        u16::from(self.sh) << 8 | u16::from(self.sl)
    }
}

/// Failure of a feature write
#[derive(Error, Debug)]
pub enum WriteError {
    /// The write went through but the display reads back something else
    #[error("value verification failed: expected {expected}, read back {actual}")]
    Verification { expected: u16, actual: u16 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Capability interface to the display control library
///
/// Every call is synchronous, may block, and can fail independently.
pub trait DisplayController {
    /// Opaque reference to an enumerated display
    type Display;
    /// Open connection to one display
    type Handle;

    /// List the attached displays in a stable order
    fn enumerate(&mut self) -> Result<Vec<Self::Display>>;

    fn open(&mut self, display: &Self::Display) -> Result<Self::Handle>;

    fn read_feature(&mut self, handle: &mut Self::Handle, feature: Feature) -> Result<VcpValue>;

    fn write_feature(
        &mut self,
        handle: &mut Self::Handle,
        feature: Feature,
        value: VcpValue,
    ) -> std::result::Result<(), WriteError>;

    /// Release a handle; consumes it so it cannot be closed twice
    fn close(&mut self, handle: Self::Handle) -> Result<()>;

    /// Human-readable report lines for a display
    fn describe(&self, display: &Self::Display) -> Vec<String>;
}
