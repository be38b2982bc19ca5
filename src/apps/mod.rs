// App trait, descriptors and the registry the launcher drives.
//
// Index 0 of every registry is the home app. Descriptors are built
// once at boot and never mutated; apps keep their own state behind
// interior mutability so the registry and each app's inbox reader can
// share a `&'static` reference.

pub mod info;
pub mod menu;
pub mod transfer;

use core::fmt;

use embassy_sync::channel::DynamicSender;

use crate::kernel::event::HmiEvent;

pub use info::{InfoApp, InfoPage};
pub use menu::MenuApp;
pub use transfer::TransferApp;

/// Upper bound on registry length; also sizes the menu's name table.
pub const MAX_APPS: usize = 16;

/// Which lifecycle callbacks an app actually implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// `init` only; the app can never be torn down in place.
    InitOnly,
    /// `init` + `deinit`.
    InitDeinit,
    /// `init`, `deinit`, `hide` and `show`.
    Full,
}

impl Capabilities {
    pub const fn has_deinit(self) -> bool {
        !matches!(self, Self::InitOnly)
    }

    pub const fn has_hide_show(self) -> bool {
        matches!(self, Self::Full)
    }
}

/// Lifecycle contract between the launcher and one application.
///
/// `init` must not return until the app is ready to own the display;
/// `deinit` must release everything the app acquired. The launcher
/// only calls `deinit`/`hide`/`show` when `capabilities()` says they
/// exist, so the defaults here are never observed by it.
pub trait App: Sync {
    fn capabilities(&self) -> Capabilities;

    fn init(&self);

    fn deinit(&self) {}

    fn hide(&self) {}

    fn show(&self) {}

    /// Called from the app's own inbox reader with every broadcast
    /// event, whether or not the app is active. Never called by the
    /// dispatcher.
    fn on_event(&self, _event: HmiEvent) {}

    /// Home only: the dispatcher moved its selection cursor to `index`.
    /// Called from the dispatcher, after the retained store is written.
    fn on_cursor(&self, _index: usize) {}
}

/// Static description of one installable application.
#[derive(Clone)]
pub struct AppDescriptor<'a> {
    pub name: &'static str,
    pub app: &'a dyn App,
    pub inbox: Option<DynamicSender<'a, HmiEvent>>,
    pub restart_before_init: bool,
    pub restart_after_deinit: bool,
}

impl<'a> AppDescriptor<'a> {
    pub const fn new(name: &'static str, app: &'a dyn App) -> Self {
        Self {
            name,
            app,
            inbox: None,
            restart_before_init: false,
            restart_after_deinit: false,
        }
    }

    pub fn with_inbox(mut self, inbox: DynamicSender<'a, HmiEvent>) -> Self {
        self.inbox = Some(inbox);
        self
    }

    pub const fn restart_before_init(mut self) -> Self {
        self.restart_before_init = true;
        self
    }

    pub const fn restart_after_deinit(mut self) -> Self {
        self.restart_after_deinit = true;
        self
    }

    /// True when tearing this app down must end in a full restart.
    pub fn needs_restart_after_deinit(&self) -> bool {
        self.restart_after_deinit || !self.app.capabilities().has_deinit()
    }
}

impl fmt::Debug for AppDescriptor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.app.capabilities())
            .field("inbox", &self.inbox.is_some())
            .field("restart_before_init", &self.restart_before_init)
            .field("restart_after_deinit", &self.restart_after_deinit)
            .finish()
    }
}

/// Malformed registry, reported before the dispatcher starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    Empty,
    TooMany { len: usize, max: usize },
    EmptyName { index: usize },
    DuplicateName { index: usize },
    /// Home must tear down in place and launch without a restart.
    HomeIncomplete,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Empty => write!(f, "registry is empty"),
            ConfigError::TooMany { len, max } => {
                write!(f, "registry holds {} apps, max {}", len, max)
            }
            ConfigError::EmptyName { index } => write!(f, "app {} has an empty name", index),
            ConfigError::DuplicateName { index } => {
                write!(f, "app {} reuses an earlier app's name", index)
            }
            ConfigError::HomeIncomplete => {
                write!(f, "home app must support in-place deinit and no restart flags")
            }
        }
    }
}

/// Validated, ordered, immutable set of descriptors. Index 0 is home.
#[derive(Clone, Copy)]
pub struct Registry<'a> {
    apps: &'a [AppDescriptor<'a>],
}

impl<'a> Registry<'a> {
    pub const HOME: usize = 0;

    pub fn new(apps: &'a [AppDescriptor<'a>]) -> Result<Self, ConfigError> {
        let home = apps.first().ok_or(ConfigError::Empty)?;
        if apps.len() > MAX_APPS {
            return Err(ConfigError::TooMany {
                len: apps.len(),
                max: MAX_APPS,
            });
        }
        if home.needs_restart_after_deinit() || home.restart_before_init {
            return Err(ConfigError::HomeIncomplete);
        }

        for (index, desc) in apps.iter().enumerate() {
            if desc.name.is_empty() {
                return Err(ConfigError::EmptyName { index });
            }
            if apps[..index].iter().any(|d| d.name == desc.name) {
                return Err(ConfigError::DuplicateName { index });
            }
        }

        Ok(Self { apps })
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    // always false once validated
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a AppDescriptor<'a>> {
        self.apps.get(index)
    }

    pub fn home(&self) -> &'a AppDescriptor<'a> {
        &self.apps[Self::HOME]
    }

    pub fn iter(&self) -> core::slice::Iter<'a, AppDescriptor<'a>> {
        self.apps.iter()
    }

    /// Valid navigation target: any index except home.
    pub fn is_secondary(&self, index: usize) -> bool {
        index > Self::HOME && index < self.apps.len()
    }

    /// Copy every name into `out` (up to its length); returns the count.
    pub fn names(&self, out: &mut [&'static str]) -> usize {
        let n = self.apps.len().min(out.len());
        for (slot, desc) in out.iter_mut().zip(self.apps.iter()) {
            *slot = desc.name;
        }
        n
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;
    use std::vec::Vec;

    use super::{App, Capabilities};
    use crate::kernel::event::HmiEvent;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Init(&'static str),
        Deinit(&'static str),
        Hide(&'static str),
        Show(&'static str),
    }

    /// Shared call log so ordering across apps can be asserted.
    pub type Journal = Mutex<Vec<Call>>;

    pub struct FakeApp<'j> {
        pub name: &'static str,
        pub caps: Capabilities,
        pub journal: &'j Journal,
        pub events: Mutex<Vec<HmiEvent>>,
        pub cursors: Mutex<Vec<usize>>,
    }

    impl<'j> FakeApp<'j> {
        pub fn new(name: &'static str, caps: Capabilities, journal: &'j Journal) -> Self {
            Self {
                name,
                caps,
                journal,
                events: Mutex::new(Vec::new()),
                cursors: Mutex::new(Vec::new()),
            }
        }
    }

    impl App for FakeApp<'_> {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn init(&self) {
            self.journal.lock().unwrap().push(Call::Init(self.name));
        }

        fn deinit(&self) {
            self.journal.lock().unwrap().push(Call::Deinit(self.name));
        }

        fn hide(&self) {
            self.journal.lock().unwrap().push(Call::Hide(self.name));
        }

        fn show(&self) {
            self.journal.lock().unwrap().push(Call::Show(self.name));
        }

        fn on_event(&self, event: HmiEvent) {
            self.events.lock().unwrap().push(event);
        }

        fn on_cursor(&self, index: usize) {
            self.cursors.lock().unwrap().push(index);
        }
    }
}
