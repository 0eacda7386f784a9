// SPDX-License-Identifier: GPL-3.0-only
//! In-memory display controller for tests
//!
//! Every simulated display stores its feature values and can be told to
//! fail a specific call. All calls are recorded so tests can check which
//! displays were contacted and that every open is matched by a close.

use std::collections::HashMap;

use anyhow::{Result, anyhow, bail};

use super::{DisplayController, VcpValue, WriteError};
use crate::invocation::Feature;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Enumerate,
    Open(usize),
    Read(usize, Feature),
    Write(usize, Feature, u16),
    Close(usize),
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedDisplay {
    pub name: String,
    pub values: HashMap<u8, u16>,
    pub fail_open: bool,
    pub fail_read: bool,
    pub fail_write: bool,
    /// Writes are accepted but this value is read back afterwards
    pub sticky_value: Option<u16>,
    pub fail_close: bool,
}

impl SimulatedDisplay {
    pub fn new(name: &str) -> Self {
        let values = Feature::ALL.iter().map(|f| (f.vcp_code(), 50)).collect();
        Self {
            name: name.to_string(),
            values,
            ..Default::default()
        }
    }

    pub fn with_value(mut self, feature: Feature, value: u16) -> Self {
        self.values.insert(feature.vcp_code(), value);
        self
    }

    pub fn value(&self, feature: Feature) -> u16 {
        self.values.get(&feature.vcp_code()).copied().unwrap_or_default()
    }
}

#[derive(Debug)]
pub struct SimulatedHandle(usize);

#[derive(Debug, Default)]
pub struct SimulatedController {
    pub displays: Vec<SimulatedDisplay>,
    pub calls: Vec<Call>,
    pub fail_enumerate: bool,
    open: Vec<bool>,
}

impl SimulatedController {
    pub fn new(displays: Vec<SimulatedDisplay>) -> Self {
        let open = vec![false; displays.len()];
        Self {
            displays,
            open,
            ..Default::default()
        }
    }

    /// Calls that touched a display (anything but enumeration)
    pub fn display_calls(&self) -> Vec<Call> {
        self.calls
            .iter()
            .copied()
            .filter(|c| *c != Call::Enumerate)
            .collect()
    }

    pub fn count(&self, wanted: impl Fn(&Call) -> bool) -> usize {
        self.calls.iter().filter(|c| wanted(*c)).count()
    }

    pub fn any_open(&self) -> bool {
        self.open.iter().any(|o| *o)
    }
}

impl DisplayController for SimulatedController {
    type Display = usize;
    type Handle = SimulatedHandle;

    fn enumerate(&mut self) -> Result<Vec<usize>> {
        self.calls.push(Call::Enumerate);
        if self.fail_enumerate {
            bail!("bus scan failed");
        }
        Ok((0..self.displays.len()).collect())
    }

    fn open(&mut self, display: &usize) -> Result<SimulatedHandle> {
        let index = *display;
        self.calls.push(Call::Open(index));
        if self.displays[index].fail_open {
            bail!("no response from display");
        }
        if self.open[index] {
            bail!("display already open");
        }
        self.open[index] = true;
        Ok(SimulatedHandle(index))
    }

    fn read_feature(&mut self, handle: &mut SimulatedHandle, feature: Feature) -> Result<VcpValue> {
        self.calls.push(Call::Read(handle.0, feature));
        let display = &self.displays[handle.0];
        if display.fail_read {
            return Err(anyhow!("checksum mismatch"));
        }
        Ok(VcpValue::from_value(display.value(feature)))
    }

    fn write_feature(
        &mut self,
        handle: &mut SimulatedHandle,
        feature: Feature,
        value: VcpValue,
    ) -> std::result::Result<(), WriteError> {
        self.calls.push(Call::Write(handle.0, feature, value.value()));
        let display = &mut self.displays[handle.0];
        if display.fail_write {
            return Err(anyhow!("write not acknowledged").into());
        }
        if let Some(actual) = display.sticky_value {
            display.values.insert(feature.vcp_code(), actual);
            return Err(WriteError::Verification {
                expected: value.value(),
                actual,
            });
        }
        display.values.insert(feature.vcp_code(), value.value());
        Ok(())
    }

    fn close(&mut self, handle: SimulatedHandle) -> Result<()> {
        self.calls.push(Call::Close(handle.0));
        self.open[handle.0] = false;
        if self.displays[handle.0].fail_close {
            bail!("bus busy");
        }
        Ok(())
    }

    fn describe(&self, display: &usize) -> Vec<String> {
        vec![format!("   Model: {}", self.displays[*display].name)]
    }
}
