// Lifecycle controller: launch / kill / hide / show over the registry
//
// A transition that can only be completed by restarting the whole
// device does not restart anything itself; it returns
// `Outcome::Restart` and the caller unwinds to the boot harness.

use core::fmt;

use log::info;

use crate::apps::{AppDescriptor, Registry};
use crate::kernel::retained::{RetainedCell, SelectionStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartReason {
    /// App `i` asked for a clean slate before its `init`.
    BeforeInit(usize),
    /// App `i` cannot be torn down in place.
    AfterDeinit(usize),
    /// The dispatcher hit a bug; home runs next.
    Fault,
}

impl fmt::Display for RestartReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartReason::BeforeInit(i) => write!(f, "restart before init of app {}", i),
            RestartReason::AfterDeinit(i) => write!(f, "restart after deinit of app {}", i),
            RestartReason::Fault => write!(f, "restart after fault"),
        }
    }
}

#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Restart(RestartReason),
}

impl Outcome {
    pub fn restart(self) -> Option<RestartReason> {
        match self {
            Outcome::Done => None,
            Outcome::Restart(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleError {
    IndexOutOfRange { index: usize, len: usize },
}

impl fmt::Display for LifecycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleError::IndexOutOfRange { index, len } => {
                write!(f, "app index {} out of range (len {})", index, len)
            }
        }
    }
}

pub struct Launcher<'a, C: RetainedCell> {
    registry: Registry<'a>,
    store: SelectionStore<'a, C>,
    active: usize,
}

impl<'a, C: RetainedCell> Launcher<'a, C> {
    pub fn new(registry: Registry<'a>, store: SelectionStore<'a, C>) -> Self {
        Self {
            registry,
            store,
            active: Registry::HOME,
        }
    }

    pub fn registry(&self) -> &Registry<'a> {
        &self.registry
    }

    pub fn store(&self) -> &SelectionStore<'a, C> {
        &self.store
    }

    pub fn active(&self) -> usize {
        self.active
    }

    fn descriptor(&self, index: usize) -> Result<&'a AppDescriptor<'a>, LifecycleError> {
        self.registry
            .get(index)
            .ok_or(LifecycleError::IndexOutOfRange {
                index,
                len: self.registry.len(),
            })
    }

    /// Bring home up at process start.
    pub fn start(&mut self) {
        let home = self.registry.home();
        home.app.init();
        self.active = Registry::HOME;
        info!("app: {} up", home.name);
    }

    pub fn launch(&mut self, index: usize) -> Result<Outcome, LifecycleError> {
        let desc = self.descriptor(index)?;
        if desc.restart_before_init {
            info!("app: {} needs a clean slate, restarting", desc.name);
            return Ok(Outcome::Restart(RestartReason::BeforeInit(index)));
        }
        desc.app.init();
        self.active = index;
        info!("app: {} launched", desc.name);
        Ok(Outcome::Done)
    }

    /// Init `index` right after the restart its `restart_before_init`
    /// flag asked for, without asking again.
    pub fn resume(&mut self, index: usize) -> Result<Outcome, LifecycleError> {
        let desc = self.descriptor(index)?;
        desc.app.init();
        self.active = index;
        info!("app: {} resumed after restart", desc.name);
        Ok(Outcome::Done)
    }

    pub fn kill(&mut self, index: usize) -> Result<Outcome, LifecycleError> {
        let desc = self.descriptor(index)?;
        if desc.app.capabilities().has_deinit() {
            desc.app.deinit();
        }

        if desc.needs_restart_after_deinit() {
            // home must come up after the restart, not this app again
            self.store.reset();
            info!("app: {} torn down, restarting", desc.name);
            return Ok(Outcome::Restart(RestartReason::AfterDeinit(index)));
        }

        if self.active == index {
            self.active = Registry::HOME;
        }
        info!("app: {} killed", desc.name);
        Ok(Outcome::Done)
    }

    /// Returns whether the app has a `hide` callback (and it ran).
    pub fn hide(&mut self, index: usize) -> Result<bool, LifecycleError> {
        let desc = self.descriptor(index)?;
        if !desc.app.capabilities().has_hide_show() {
            return Ok(false);
        }
        desc.app.hide();
        Ok(true)
    }

    /// Returns whether the app has a `show` callback (and it ran).
    pub fn show(&mut self, index: usize) -> Result<bool, LifecycleError> {
        let desc = self.descriptor(index)?;
        if !desc.app.capabilities().has_hide_show() {
            return Ok(false);
        }
        desc.app.show();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicU32;
    use std::sync::Mutex;
    use std::vec::Vec;

    use super::*;
    use crate::apps::testing::{Call, FakeApp, Journal};
    use crate::apps::{AppDescriptor, Capabilities};
    use crate::kernel::retained::ResetCause;

    struct Rig<'j> {
        home: FakeApp<'j>,
        plain: FakeApp<'j>,
        no_deinit: FakeApp<'j>,
        flagged: FakeApp<'j>,
        fresh: FakeApp<'j>,
    }

    impl<'j> Rig<'j> {
        fn new(j: &'j Journal) -> Self {
            Self {
                home: FakeApp::new("home", Capabilities::Full, j),
                plain: FakeApp::new("plain", Capabilities::InitDeinit, j),
                no_deinit: FakeApp::new("no deinit", Capabilities::InitOnly, j),
                flagged: FakeApp::new("flagged", Capabilities::InitDeinit, j),
                fresh: FakeApp::new("fresh", Capabilities::InitDeinit, j),
            }
        }

        fn descriptors(&self) -> [AppDescriptor<'_>; 5] {
            [
                AppDescriptor::new("home", &self.home),
                AppDescriptor::new("plain", &self.plain),
                AppDescriptor::new("no deinit", &self.no_deinit),
                AppDescriptor::new("flagged", &self.flagged).restart_after_deinit(),
                AppDescriptor::new("fresh", &self.fresh).restart_before_init(),
            ]
        }
    }

    fn calls(j: &Journal) -> Vec<Call> {
        core::mem::take(&mut *j.lock().unwrap())
    }

    #[test]
    fn launch_then_kill_returns_home_in_place() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(1);
        let store = SelectionStore::recover(&cell, ResetCause::Software, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        assert_eq!(l.launch(1), Ok(Outcome::Done));
        assert_eq!(l.active(), 1);
        assert_eq!(l.kill(1), Ok(Outcome::Done));
        assert_eq!(l.active(), 0);
        assert_eq!(calls(&j), [Call::Init("plain"), Call::Deinit("plain")]);
        // in-place teardown leaves the cursor alone
        assert_eq!(l.store().load(), 1);
    }

    #[test]
    fn kill_without_deinit_resets_store_and_restarts() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(2);
        let store = SelectionStore::recover(&cell, ResetCause::Software, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        assert_eq!(l.launch(2), Ok(Outcome::Done));
        assert_eq!(
            l.kill(2),
            Ok(Outcome::Restart(RestartReason::AfterDeinit(2)))
        );
        assert_eq!(cell.read(), 0);
        assert_eq!(l.active(), 2);
        assert_eq!(calls(&j), [Call::Init("no deinit")]);
    }

    #[test]
    fn kill_with_restart_flag_runs_deinit_first() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(3);
        let store = SelectionStore::recover(&cell, ResetCause::Software, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        assert_eq!(l.launch(3), Ok(Outcome::Done));
        let out = l.kill(3).unwrap();
        assert_eq!(out.restart(), Some(RestartReason::AfterDeinit(3)));
        assert_eq!(cell.read(), 0);
        assert_eq!(calls(&j), [Call::Init("flagged"), Call::Deinit("flagged")]);
    }

    #[test]
    fn restart_before_init_skips_init() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(4);
        let store = SelectionStore::recover(&cell, ResetCause::Software, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        assert_eq!(
            l.launch(4),
            Ok(Outcome::Restart(RestartReason::BeforeInit(4)))
        );
        assert_eq!(l.active(), 0);
        assert!(calls(&j).is_empty());
        // the cursor still points at the app so boot can resume it
        assert_eq!(cell.read(), 4);

        assert_eq!(l.resume(4), Ok(Outcome::Done));
        assert_eq!(l.active(), 4);
        assert_eq!(calls(&j), [Call::Init("fresh")]);
    }

    #[test]
    fn killing_an_inactive_app_keeps_active() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(0);
        let store = SelectionStore::recover(&cell, ResetCause::PowerOn, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        l.start();
        assert_eq!(l.kill(0), Ok(Outcome::Done));
        assert_eq!(l.launch(1), Ok(Outcome::Done));
        assert_eq!(l.kill(0), Ok(Outcome::Done));
        assert_eq!(l.active(), 1);
    }

    #[test]
    fn hide_and_show_report_whether_a_callback_ran() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(0);
        let store = SelectionStore::recover(&cell, ResetCause::PowerOn, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        assert_eq!(l.hide(0), Ok(true));
        assert_eq!(l.show(0), Ok(true));
        assert_eq!(l.hide(1), Ok(false));
        assert_eq!(l.show(2), Ok(false));
        assert_eq!(calls(&j), [Call::Hide("home"), Call::Show("home")]);
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let j = Mutex::new(Vec::new());
        let rig = Rig::new(&j);
        let apps = rig.descriptors();
        let cell = AtomicU32::new(0);
        let store = SelectionStore::recover(&cell, ResetCause::PowerOn, apps.len());
        let mut l = Launcher::new(Registry::new(&apps).unwrap(), store);

        let err = LifecycleError::IndexOutOfRange { index: 5, len: 5 };
        assert_eq!(l.launch(5), Err(err));
        assert_eq!(l.kill(5), Err(err));
        assert_eq!(l.hide(5), Err(err));
        assert_eq!(l.show(5), Err(err));
        assert_eq!(l.resume(5), Err(err));
        assert!(calls(&j).is_empty());
    }
}
