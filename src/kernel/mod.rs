// Launcher core: event plumbing, retained selection, lifecycle control
// and the dispatcher loop. Single writer, no locks: the dispatcher owns
// every piece of mutable launcher state.

pub mod config;
pub mod dispatcher;
pub mod event;
pub mod launcher;
pub mod poll;
pub mod retained;
#[cfg(feature = "board")]
pub mod tasks;

pub use config::LauncherConfig;
pub use dispatcher::{DispatchStats, Dispatcher};
pub use event::{AppInbox, DispatchInbox, HmiEvent, InputPort};
pub use launcher::{Launcher, LifecycleError, Outcome, RestartReason};
pub use retained::{ResetCause, RetainedCell, SelectionStore};
