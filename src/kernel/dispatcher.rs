// Event dispatcher: the one control loop that owns launcher state
//
// Blocks on a single-slot inbox, handles each event to completion,
// then copies it to every app inbox. `active` and the selection
// cursor are written here and nowhere else, so nothing is locked.
//
// up / down    move the cursor (home only), wrapping inside 1..len
// ok           leave home for the app under the cursor
// double-click kill whatever is active and go home
// click / long delivered to apps only

use log::{debug, error, info};

use crate::apps::Registry;
use crate::kernel::config::LauncherConfig;
use crate::kernel::event::{self, DispatchInbox, HmiEvent};
use crate::kernel::launcher::{Launcher, LifecycleError, Outcome, RestartReason};
use crate::kernel::retained::RetainedCell;

/// Advance the cursor, wrapping past the last app to 1 (never home).
#[inline]
pub fn cursor_up(current: usize, len: usize) -> usize {
    if len < 2 {
        return current;
    }
    if current + 1 >= len { 1 } else { current + 1 }
}

/// Retreat the cursor, wrapping below 1 to the last app.
#[inline]
pub fn cursor_down(current: usize, len: usize) -> usize {
    if len < 2 {
        return current;
    }
    if current <= 1 { len - 1 } else { current - 1 }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub handled: u32,
    pub fanout_dropped: u32,
}

pub struct Dispatcher<'a, C: RetainedCell> {
    launcher: Launcher<'a, C>,
    inbox: &'a DispatchInbox,
    selected: usize,
    config: LauncherConfig,
    stats: DispatchStats,
}

impl<'a, C: RetainedCell> Dispatcher<'a, C> {
    pub fn new(launcher: Launcher<'a, C>, inbox: &'a DispatchInbox, config: LauncherConfig) -> Self {
        let selected = launcher.store().load();
        Self {
            launcher,
            inbox,
            selected,
            config,
            stats: DispatchStats::default(),
        }
    }

    pub fn active(&self) -> usize {
        self.launcher.active()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn registry(&self) -> &Registry<'a> {
        self.launcher.registry()
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Start home, then (warm restart only) resume the app the cursor
    /// was left on. Home's `init` always runs first.
    ///
    /// An app flagged `restart_before_init` is resumed even with
    /// `auto_resume` off: the restart just taken was its own.
    pub fn boot(&mut self) -> Outcome {
        self.launcher.start();

        let target = self.selected;
        let Some(desc) = self.registry().get(target).filter(|_| target != Registry::HOME) else {
            return Outcome::Done;
        };
        if !self.config.auto_resume && !desc.restart_before_init {
            return Outcome::Done;
        }
        info!("boot: resuming {}", desc.name);

        let killed = self.launcher.kill(Registry::HOME);
        if let Outcome::Restart(reason) = self.settle(killed) {
            return Outcome::Restart(reason);
        }
        let resumed = self.launcher.resume(target);
        self.settle(resumed)
    }

    /// Run until some transition needs a full restart.
    pub async fn run(&mut self) -> RestartReason {
        info!(
            "dispatcher: running, {} apps, cursor {}",
            self.registry().len(),
            self.selected
        );
        loop {
            let event = self.inbox.receive().await;
            if let Outcome::Restart(reason) = self.handle(event) {
                return reason;
            }
        }
    }

    /// Handle one event to completion, then broadcast it.
    pub fn handle(&mut self, event: HmiEvent) -> Outcome {
        debug!(
            "dispatcher: {} (active {}, cursor {})",
            event,
            self.active(),
            self.selected
        );

        let outcome = match event {
            HmiEvent::Up => {
                self.move_cursor(cursor_up);
                Outcome::Done
            }
            HmiEvent::Down => {
                self.move_cursor(cursor_down);
                Outcome::Done
            }
            HmiEvent::Ok => {
                if self.active() == Registry::HOME && self.registry().is_secondary(self.selected) {
                    self.switch(Registry::HOME, self.selected)
                } else {
                    Outcome::Done
                }
            }
            HmiEvent::MenuDoubleClick => {
                let active = self.active();
                if active != Registry::HOME {
                    self.switch(active, Registry::HOME)
                } else {
                    Outcome::Done
                }
            }
            HmiEvent::MenuClick | HmiEvent::MenuLongPress => Outcome::Done,
        };

        self.stats.handled = self.stats.handled.wrapping_add(1);
        let dropped = event::fan_out(self.registry(), event);
        if dropped > 0 {
            debug!("dispatcher: {} app inbox(es) full, {} dropped", dropped, event);
            self.stats.fanout_dropped = self.stats.fanout_dropped.wrapping_add(dropped);
        }

        outcome
    }

    // cursor is frozen while a secondary app owns the screen
    fn move_cursor(&mut self, step: fn(usize, usize) -> usize) {
        if self.active() != Registry::HOME {
            return;
        }
        let next = step(self.selected, self.registry().len());
        if next != self.selected {
            self.selected = next;
            self.launcher.store().store(next);
            self.registry().home().app.on_cursor(next);
        }
    }

    fn switch(&mut self, from: usize, to: usize) -> Outcome {
        let killed = self.launcher.kill(from);
        match self.settle(killed) {
            Outcome::Done => {
                let launched = self.launcher.launch(to);
                self.settle(launched)
            }
            restart => restart,
        }
    }

    fn settle(&mut self, result: Result<Outcome, LifecycleError>) -> Outcome {
        match result {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("dispatcher: {}", e);
                self.launcher.store().reset();
                Outcome::Restart(RestartReason::Fault)
            }
        }
    }
}
