//! Button definitions for the ESP32-S3-USB-OTG board
//!
//! Four discrete buttons, each on its own GPIO, active LOW with an
//! internal pull-up. The board routes MENU to the launcher's global
//! gestures; OK / UP / DOWN are plain clicks.

/// All physical buttons on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Ok,
    Up,
    Down,
    Menu,
}

impl Button {
    /// Scan order when more than one button reads low.
    pub const ALL: [Button; 4] = [Button::Menu, Button::Ok, Button::Up, Button::Down];

    pub const fn name(self) -> &'static str {
        match self {
            Button::Ok => "OK",
            Button::Up => "Up",
            Button::Down => "Down",
            Button::Menu => "Menu",
        }
    }
}

impl core::fmt::Display for Button {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
