// Input drivers, board-independent.
//
// `input` turns raw per-poll button samples into debounced press and
// release edges; `click` turns those edges into launcher gestures.
// Pin reads live in board/.

pub mod click;
pub mod input;

pub use click::ClickClassifier;
pub use input::{Debouncer, Event};
