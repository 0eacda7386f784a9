use std::ops::Range;

use crate::error::{AppError, Result};
use crate::invocation::Target;
use crate::protocols::DisplayController;

/// Enumerate displays through the controller, keeping at most `max_displays`
/// in enumeration order.
pub fn enumerate_displays<C: DisplayController>(
    controller: &mut C,
    max_displays: usize,
) -> Result<Vec<C::Display>> {
    info!("=== START ENUMERATE ===");

    let mut displays = controller.enumerate().map_err(AppError::Enumerate)?;
    if displays.len() > max_displays {
        warn!(
            "Found {} displays, only the first {} are used",
            displays.len(),
            max_displays
        );
        displays.truncate(max_displays);
    }

    info!("=== END ENUMERATE: Found {} displays ===", displays.len());
    Ok(displays)
}

/// Resolve a target to a 0-based index range over `count` displays
pub fn resolve(target: Target, count: usize) -> Result<Range<usize>> {
    if count == 0 {
        return Err(AppError::NoDisplaysFound);
    }

    match target {
        Target::Default => Ok(0..1),
        Target::All => Ok(0..count),
        Target::Index(index) if (1..=count).contains(&index) => Ok(index - 1..index),
        Target::Index(index) => Err(AppError::TargetOutOfRange {
            index,
            available: count,
        }),
    }
}
