// Button events and the bounded, lossy inboxes that carry them.
//
// Every send in the system is a `try_send`: a full inbox drops the
// event instead of stalling the producer. The dispatcher inbox holds
// exactly one pending event.

use core::fmt;
use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, DynamicSender};

use crate::apps::Registry;

/// Capacity of the dispatcher's own inbox.
pub const DISPATCH_INBOX_CAP: usize = 1;

/// Capacity of each application's private inbox.
pub const APP_INBOX_CAP: usize = 4;

/// Classified input, one value per physical gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmiEvent {
    MenuClick,
    MenuDoubleClick,
    MenuLongPress,
    Up,
    Down,
    Ok,
}

impl HmiEvent {
    pub const fn name(self) -> &'static str {
        match self {
            HmiEvent::MenuClick => "menu click",
            HmiEvent::MenuDoubleClick => "menu double click",
            HmiEvent::MenuLongPress => "menu long press",
            HmiEvent::Up => "up",
            HmiEvent::Down => "down",
            HmiEvent::Ok => "ok",
        }
    }
}

impl fmt::Display for HmiEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type DispatchInbox = Channel<CriticalSectionRawMutex, HmiEvent, DISPATCH_INBOX_CAP>;

pub type AppInbox = Channel<CriticalSectionRawMutex, HmiEvent, APP_INBOX_CAP>;

/// Producer side of the dispatcher inbox.
///
/// Cheap to share: input tasks hold a `&'static InputPort`.
pub struct InputPort<'a> {
    inbox: &'a DispatchInbox,
    dropped: AtomicU32,
}

impl<'a> InputPort<'a> {
    pub const fn new(inbox: &'a DispatchInbox) -> Self {
        Self {
            inbox,
            dropped: AtomicU32::new(0),
        }
    }

    /// Post without blocking. Returns `false` if the previous event has
    /// not been consumed yet, in which case `event` is dropped.
    pub fn post(&self, event: HmiEvent) -> bool {
        match self.inbox.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                log::warn!("input: dispatcher busy, dropped {} ({} total)", event, total);
                false
            }
        }
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Copy `event` into every descriptor's inbox, in registry order.
///
/// Apps without an inbox are skipped; full inboxes drop silently.
/// Returns how many copies were dropped.
pub fn fan_out(registry: &Registry<'_>, event: HmiEvent) -> u32 {
    let mut dropped = 0;
    for desc in registry.iter() {
        if let Some(inbox) = &desc.inbox {
            if !try_deliver(inbox, event) {
                dropped += 1;
            }
        }
    }
    dropped
}

#[inline]
fn try_deliver(inbox: &DynamicSender<'_, HmiEvent>, event: HmiEvent) -> bool {
    inbox.try_send(event).is_ok()
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::vec::Vec;

    use super::*;
    use crate::apps::testing::FakeApp;
    use crate::apps::{AppDescriptor, Capabilities};

    #[test]
    fn port_holds_one_event_and_drops_the_next() {
        let inbox = DispatchInbox::new();
        let port = InputPort::new(&inbox);

        assert!(port.post(HmiEvent::Up));
        assert!(!port.post(HmiEvent::Down));
        assert_eq!(port.dropped(), 1);

        assert_eq!(inbox.try_receive().ok(), Some(HmiEvent::Up));
        assert!(inbox.try_receive().is_err());

        assert!(port.post(HmiEvent::Ok));
        assert_eq!(inbox.try_receive().ok(), Some(HmiEvent::Ok));
    }

    #[test]
    fn fan_out_reaches_every_inbox_and_drops_when_full() {
        let j = Mutex::new(Vec::new());
        let home = FakeApp::new("home", Capabilities::Full, &j);
        let quiet = FakeApp::new("quiet", Capabilities::InitDeinit, &j);
        let loud = FakeApp::new("loud", Capabilities::InitDeinit, &j);

        let home_inbox = AppInbox::new();
        let loud_inbox = AppInbox::new();

        let apps = [
            AppDescriptor::new("home", &home).with_inbox(home_inbox.dyn_sender()),
            AppDescriptor::new("quiet", &quiet),
            AppDescriptor::new("loud", &loud).with_inbox(loud_inbox.dyn_sender()),
        ];
        let reg = Registry::new(&apps).unwrap();

        for _ in 0..APP_INBOX_CAP {
            assert_eq!(fan_out(&reg, HmiEvent::Up), 0);
        }
        // both inboxes are now full
        assert_eq!(fan_out(&reg, HmiEvent::Down), 2);

        let _ = home_inbox.try_receive();
        assert_eq!(fan_out(&reg, HmiEvent::Ok), 1);

        let drained: Vec<HmiEvent> = core::iter::from_fn(|| home_inbox.try_receive().ok()).collect();
        assert_eq!(drained.last(), Some(&HmiEvent::Ok));
        assert!(!drained.contains(&HmiEvent::Down));
    }

    #[test]
    fn shared_inbox_gets_one_copy_per_descriptor() {
        let j = Mutex::new(Vec::new());
        let home = FakeApp::new("home", Capabilities::Full, &j);
        let page = FakeApp::new("page", Capabilities::InitDeinit, &j);

        let shared = AppInbox::new();
        let apps = [
            AppDescriptor::new("home", &home),
            AppDescriptor::new("page a", &page).with_inbox(shared.dyn_sender()),
            AppDescriptor::new("page b", &page).with_inbox(shared.dyn_sender()),
        ];
        let reg = Registry::new(&apps).unwrap();

        assert_eq!(fan_out(&reg, HmiEvent::Up), 0);
        assert_eq!(shared.len(), 2);
    }
}
