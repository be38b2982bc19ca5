// Debounced press/release from the four GPIO buttons
//
// One button at a time: the board layer reports the first low pin in
// scan order, we collapse that into `Option<Button>` per poll.
// 30ms settle time. Gesture timing (long press, double click) lives
// in the click classifier, not here.

use embassy_time::{Duration, Instant};

use crate::board::button::Button;

const DEBOUNCE_MS: u64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Press(Button),
    Release(Button),
}

// a button swap yields Release + Press from one poll
struct EventQueue {
    buf: [Option<Event>; 2],
}

impl EventQueue {
    const fn new() -> Self {
        Self { buf: [None; 2] }
    }

    fn push(&mut self, ev: Event) {
        for slot in self.buf.iter_mut() {
            if slot.is_none() {
                *slot = Some(ev);
                return;
            }
        }
    }

    fn pop(&mut self) -> Option<Event> {
        for slot in self.buf.iter_mut() {
            if let Some(ev) = slot.take() {
                return Some(ev);
            }
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.buf.iter().all(|s| s.is_none())
    }
}

pub struct Debouncer {
    stable: Option<Button>,
    candidate: Option<Button>,
    candidate_since: Instant,
    queue: EventQueue,
}

impl Debouncer {
    pub fn new(now: Instant) -> Self {
        Self {
            stable: None,
            candidate: None,
            candidate_since: now,
            queue: EventQueue::new(),
        }
    }

    /// Feed one raw sample; yields at most one event per call.
    pub fn update(&mut self, raw: Option<Button>, now: Instant) -> Option<Event> {
        if !self.queue.is_empty() {
            return self.queue.pop();
        }

        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since = now;
        }

        let debounced = if now - self.candidate_since >= Duration::from_millis(DEBOUNCE_MS) {
            self.candidate
        } else {
            self.stable
        };

        if debounced != self.stable {
            if let Some(old) = self.stable {
                self.queue.push(Event::Release(old));
            }
            if let Some(new) = debounced {
                self.queue.push(Event::Press(new));
            }
            self.stable = debounced;
            return self.queue.pop();
        }

        None
    }

    pub fn is_debouncing(&self) -> bool {
        self.candidate != self.stable
    }
}
