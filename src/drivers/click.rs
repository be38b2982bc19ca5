// Press/release -> launcher gestures
//
// OK / UP / DOWN click on release. MENU has three gestures:
//   click        released, no second press within DOUBLE_CLICK_MS
//   double click second press lands inside the window; fires on its release
//   long press   held LONG_PRESS_MS; fires once, the release is swallowed
// Timed gestures only resolve in `tick`, so call it every poll.

use embassy_time::{Duration, Instant};

use crate::board::button::Button;
use crate::drivers::input::Event;
use crate::kernel::event::HmiEvent;

const DOUBLE_CLICK_MS: u64 = 300;
const LONG_PRESS_MS: u64 = 800;

pub struct ClickClassifier {
    held: Option<(Button, Instant)>,
    long_fired: bool,
    // release time of a menu click still waiting for a second press
    menu_pending: Option<Instant>,
    menu_second: bool,
}

impl Default for ClickClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ClickClassifier {
    pub const fn new() -> Self {
        Self {
            held: None,
            long_fired: false,
            menu_pending: None,
            menu_second: false,
        }
    }

    pub fn on_event(&mut self, event: Event, now: Instant) -> Option<HmiEvent> {
        match event {
            Event::Press(button) => {
                self.held = Some((button, now));
                self.long_fired = false;

                let pending = self.menu_pending.take();
                match (button, pending) {
                    (Button::Menu, Some(_)) => {
                        self.menu_second = true;
                        None
                    }
                    // another button interrupts: the first click stands alone
                    (_, Some(_)) => Some(HmiEvent::MenuClick),
                    _ => None,
                }
            }
            Event::Release(button) => {
                let Some((held, _)) = self.held.take() else {
                    return None;
                };
                if held != button || self.long_fired {
                    self.menu_second = false;
                    return None;
                }
                match button {
                    Button::Ok => Some(HmiEvent::Ok),
                    Button::Up => Some(HmiEvent::Up),
                    Button::Down => Some(HmiEvent::Down),
                    Button::Menu if self.menu_second => {
                        self.menu_second = false;
                        Some(HmiEvent::MenuDoubleClick)
                    }
                    Button::Menu => {
                        self.menu_pending = Some(now);
                        None
                    }
                }
            }
        }
    }

    /// Resolve time-based gestures.
    pub fn tick(&mut self, now: Instant) -> Option<HmiEvent> {
        if let Some((button, since)) = self.held {
            if !self.long_fired && now - since >= Duration::from_millis(LONG_PRESS_MS) {
                self.long_fired = true;
                if button == Button::Menu {
                    self.menu_second = false;
                    return Some(HmiEvent::MenuLongPress);
                }
            }
            return None;
        }

        if let Some(released) = self.menu_pending
            && now - released > Duration::from_millis(DOUBLE_CLICK_MS)
        {
            self.menu_pending = None;
            return Some(HmiEvent::MenuClick);
        }
        None
    }

    /// True while a gesture is still undecided and needs `tick`s.
    pub fn is_pending(&self) -> bool {
        self.held.is_some() || self.menu_pending.is_some()
    }
}
