// SPDX-License-Identifier: GPL-3.0-only
//! DDC/CI (Display Data Channel Command Interface) protocol implementation
//!
//! DDC/CI is a standard protocol for controlling monitors over I2C bus.
//! It's supported by most modern external monitors via the video cable.
//! All wire-level work is done by `ddc-hi`.

use anyhow::{Context, Result, anyhow};
use ddc_hi::{Ddc, Display};

use super::{DisplayController, VcpValue, WriteError};
use crate::invocation::Feature;

/// Identity of an enumerated DDC/CI display
#[derive(Debug, Clone)]
pub struct DdcCiRef {
    slot: usize,
    backend: String,
    id: String,
    manufacturer: Option<String>,
    model_name: Option<String>,
    model_id: Option<u16>,
    serial_number: Option<String>,
}

/// Open DDC/CI display, checked out of its enumeration slot
pub struct DdcCiHandle {
    slot: usize,
    display: Display,
}

impl std::fmt::Debug for DdcCiHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DdcCiHandle(slot: {}, id: {})", self.slot, self.display.info.id)
    }
}

/// `ddc-hi` backed controller
///
/// `ddc-hi` opens the bus while enumerating, so each display lives in a
/// slot until `open` checks it out and `close` returns it.
pub struct DdcCiController {
    slots: Vec<Option<Display>>,
    verify_writes: bool,
}

impl DdcCiController {
    pub fn new(verify_writes: bool) -> Self {
        Self {
            slots: Vec::new(),
            verify_writes,
        }
    }
}

impl DisplayController for DdcCiController {
    type Display = DdcCiRef;
    type Handle = DdcCiHandle;

    fn enumerate(&mut self) -> Result<Vec<DdcCiRef>> {
        let displays = Display::enumerate();
        info!("Found {} DDC/CI display(s)", displays.len());

        let refs = displays
            .iter()
            .enumerate()
            .map(|(slot, display)| {
                let info = &display.info;
                debug!(
                    slot,
                    id = %info.id,
                    model = ?info.model_name,
                    "Enumerated DDC/CI display"
                );
                DdcCiRef {
                    slot,
                    backend: format!("{:?}", info.backend),
                    id: info.id.clone(),
                    manufacturer: info.manufacturer_id.clone(),
                    model_name: info.model_name.clone(),
                    model_id: info.model_id,
                    serial_number: info.serial_number.clone(),
                }
            })
            .collect();

        self.slots = displays.into_iter().map(Some).collect();
        Ok(refs)
    }

    fn open(&mut self, display_ref: &DdcCiRef) -> Result<DdcCiHandle> {
        let checked_out = self
            .slots
            .get_mut(display_ref.slot)
            .ok_or_else(|| anyhow!("display {} is no longer enumerated", display_ref.id))?
            .take()
            .ok_or_else(|| anyhow!("display {} is already open", display_ref.id))?;

        debug!(id = %checked_out.info.id, "Opened DDC/CI display");
        Ok(DdcCiHandle {
            slot: display_ref.slot,
            display: checked_out,
        })
    }

    fn read_feature(&mut self, handle: &mut DdcCiHandle, feature: Feature) -> Result<VcpValue> {
        let value = handle
            .display
            .handle
            .get_vcp_feature(feature.vcp_code())
            .with_context(|| format!("get VCP feature 0x{:02x}", feature.vcp_code()))?;

        Ok(VcpValue {
            sh: value.sh,
            sl: value.sl,
        })
    }

    fn write_feature(
        &mut self,
        handle: &mut DdcCiHandle,
        feature: Feature,
        value: VcpValue,
    ) -> std::result::Result<(), WriteError> {
        handle
            .display
            .handle
            .set_vcp_feature(feature.vcp_code(), value.value())
            .with_context(|| format!("set VCP feature 0x{:02x}", feature.vcp_code()))?;

        if self.verify_writes {
            let actual = self.read_feature(handle, feature)?.value();
            if actual != value.value() {
                return Err(WriteError::Verification {
                    expected: value.value(),
                    actual,
                });
            }
        }
        Ok(())
    }

    fn close(&mut self, handle: DdcCiHandle) -> Result<()> {
        let slot = self
            .slots
            .get_mut(handle.slot)
            .ok_or_else(|| anyhow!("display {} is no longer enumerated", handle.display.info.id))?;
        debug!(id = %handle.display.info.id, "Closed DDC/CI display");
        *slot = Some(handle.display);
        Ok(())
    }

    fn describe(&self, display: &DdcCiRef) -> Vec<String> {
        let unknown = || "unknown".to_string();
        let mut lines = vec![
            format!("   Backend:      {}", display.backend),
            format!("   ID:           {}", display.id),
            format!(
                "   Manufacturer: {}",
                display.manufacturer.clone().unwrap_or_else(unknown)
            ),
            format!(
                "   Model:        {}",
                display.model_name.clone().unwrap_or_else(unknown)
            ),
        ];
        if let Some(model_id) = display.model_id {
            lines.push(format!("   Product code: 0x{model_id:04x}"));
        }
        if let Some(serial) = &display.serial_number {
            lines.push(format!("   Serial:       {serial}"));
        }
        lines
    }
}
