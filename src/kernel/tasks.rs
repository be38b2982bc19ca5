// Embassy spawned tasks: button polling and per-app inbox readers
//
//   * `input_task`  owns the button pins. Polls on an adaptive timer,
//                   debounces, classifies gestures and posts them to the
//                   dispatcher through the shared `InputPort`. Never
//                   blocks on the dispatcher: a busy inbox drops the
//                   gesture.
//
//   * `inbox_task`  one per app inbox. Drains broadcast copies and
//                   hands them to the app's `on_event`.
//
// The dispatcher itself runs in main's task; it owns all launcher state.

use embassy_time::{Instant, Timer};
use log::debug;

use crate::apps::App;
use crate::board::ButtonsHw;
use crate::drivers::click::ClickClassifier;
use crate::drivers::input::Debouncer;
use crate::kernel::event::{AppInbox, InputPort};
use crate::kernel::poll::AdaptivePoller;

/// Number of `inbox_task` instances that may be spawned.
pub const INBOX_TASK_POOL: usize = 5;

/// The button polling task.
///
/// Polls fast while a press is settling or a gesture is undecided,
/// slows to 100 ms when idle. The click classifier needs `tick` on every
/// poll so double-click timeouts and long presses resolve without a
/// further edge.
#[embassy_executor::task]
pub async fn input_task(buttons: ButtonsHw, port: &'static InputPort<'static>) -> ! {
    let mut debouncer = Debouncer::new(Instant::now());
    let mut classifier = ClickClassifier::new();
    let mut poller = AdaptivePoller::new();

    loop {
        let now = Instant::now();
        let raw = buttons.read_pressed();

        let edge = debouncer.update(raw, now);
        let gesture = match edge {
            Some(ev) => {
                debug!("input: {:?}", ev);
                classifier.on_event(ev, now)
            }
            None => None,
        };
        // at most one timed gesture per poll, after any edge gesture
        for event in gesture.into_iter().chain(classifier.tick(now)) {
            debug!("input: gesture {}", event);
            port.post(event);
        }

        let active = raw.is_some() || debouncer.is_debouncing() || classifier.is_pending();
        Timer::after(poller.next_interval(active)).await;
    }
}

/// Inbox reader for one app.
///
/// The app ignores what it is not interested in, including everything
/// while it is not running.
#[embassy_executor::task(pool_size = INBOX_TASK_POOL)]
pub async fn inbox_task(name: &'static str, inbox: &'static AppInbox, app: &'static dyn App) -> ! {
    debug!("{}: inbox reader up", name);
    loop {
        let event = inbox.receive().await;
        app.on_event(event);
    }
}
