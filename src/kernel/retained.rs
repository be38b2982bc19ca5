// Selection index that survives a warm restart
//
// Backed by one word of memory that keeps its contents across a
// software reset but not across power loss. The word is only trusted
// when the reset cause says the restart was software-initiated; any
// other cause zeroes it before first use.

use core::sync::atomic::{AtomicU32, Ordering};

/// One word of restart-retained memory.
pub trait RetainedCell {
    fn read(&self) -> u32;
    fn write(&self, value: u32);
}

impl RetainedCell for AtomicU32 {
    fn read(&self) -> u32 {
        self.load(Ordering::Acquire)
    }

    fn write(&self, value: u32) {
        self.store(value, Ordering::Release);
    }
}

/// Why the chip came out of reset, reduced to what the launcher acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetCause {
    PowerOn,
    Software,
    Watchdog,
    Panic,
    DeepSleep,
    Other,
}

impl ResetCause {
    /// Only a software restart leaves the retained word meaningful.
    pub const fn is_warm(self) -> bool {
        matches!(self, ResetCause::Software)
    }
}

pub struct SelectionStore<'a, C: RetainedCell> {
    cell: &'a C,
}

impl<'a, C: RetainedCell> SelectionStore<'a, C> {
    /// Validate the retained word for a registry of `len` apps.
    ///
    /// Cold boots and out-of-range values both leave the store at 0.
    pub fn recover(cell: &'a C, cause: ResetCause, len: usize) -> Self {
        let store = Self { cell };
        let raw = cell.read();

        if !cause.is_warm() {
            if raw != 0 {
                log::info!("selection: {:?} reset, ignoring stale index {}", cause, raw);
            }
            store.reset();
        } else if raw as usize >= len {
            log::warn!("selection: retained index {} out of range (len {})", raw, len);
            store.reset();
        }
        store
    }

    pub fn load(&self) -> usize {
        self.cell.read() as usize
    }

    pub fn store(&self, index: usize) {
        self.cell.write(index as u32);
    }

    /// Guarantee home runs after the next restart.
    pub fn reset(&self) {
        self.cell.write(0);
    }
}

// unlikely to survive power-on as noise
const FAULT_MARK: u32 = 0x0FA1_7ED0;

/// Last words of a fatal fault: point the selection at home and leave a
/// mark so the next boot knows the software reset was a panic.
pub fn mark_fault(selection: &impl RetainedCell, marker: &impl RetainedCell) {
    selection.write(0);
    marker.write(FAULT_MARK);
}

/// Refine the hardware reset cause with the fault mark, consuming it.
///
/// Only a software reset can follow `mark_fault`; any other cause keeps
/// its own reading. The mark is cleared on every boot.
pub fn take_fault(cause: ResetCause, marker: &impl RetainedCell) -> ResetCause {
    let marked = marker.read() == FAULT_MARK;
    marker.write(0);
    if marked && cause == ResetCause::Software {
        ResetCause::Panic
    } else {
        cause
    }
}
