// Launcher tunables, fixed at build time.

/// Boot-time policy knobs for the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherConfig {
    /// After a warm restart, relaunch the app the cursor was left on.
    /// Apps flagged `restart_before_init` are relaunched regardless.
    pub auto_resume: bool,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl LauncherConfig {
    pub const fn new() -> Self {
        Self { auto_resume: true }
    }

    pub const fn with_auto_resume(mut self, on: bool) -> Self {
        self.auto_resume = on;
        self
    }
}
