// Config copy tool: each ok while open is one copy request.
//
// Holds no global resources, so it tears down in place.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::info;

use crate::apps::{App, Capabilities};
use crate::kernel::event::HmiEvent;

pub struct TransferApp {
    running: AtomicBool,
    requests: AtomicU32,
}

impl Default for TransferApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferApp {
    pub const fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            requests: AtomicU32::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Copies requested since the last `init`.
    pub fn requests(&self) -> u32 {
        self.requests.load(Ordering::Relaxed)
    }
}

impl App for TransferApp {
    fn capabilities(&self) -> Capabilities {
        Capabilities::InitDeinit
    }

    fn init(&self) {
        self.requests.store(0, Ordering::Relaxed);
        self.running.store(true, Ordering::Release);
        info!("transfer: press ok to copy config");
    }

    fn deinit(&self) {
        self.running.store(false, Ordering::Release);
        info!("transfer: closed after {} request(s)", self.requests());
    }

    fn on_event(&self, event: HmiEvent) {
        if event != HmiEvent::Ok || !self.is_running() {
            return;
        }
        let n = self.requests.fetch_add(1, Ordering::Relaxed) + 1;
        info!("transfer: copy #{} requested", n);
    }
}
