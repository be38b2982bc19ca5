// Home screen: the app list the cursor walks over
//
// The dispatcher pushes every cursor move through `on_cursor`, so the
// highlighted entry is always the one `ok` would open, even when this
// app's inbox drops events. Output goes to the log; the LCD layer draws
// from `highlighted()`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;

use crate::apps::{App, Capabilities, MAX_APPS, Registry};
use crate::kernel::event::HmiEvent;

struct MenuState {
    running: bool,
    visible: bool,
    cursor: usize,
    names: [&'static str; MAX_APPS],
    count: usize,
}

pub struct MenuApp {
    state: Mutex<CriticalSectionRawMutex, RefCell<MenuState>>,
}

impl Default for MenuApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuApp {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(MenuState {
                running: false,
                visible: false,
                cursor: 0,
                names: [""; MAX_APPS],
                count: 0,
            })),
        }
    }

    /// Take the entry list from the registry this app is home of.
    pub fn set_entries(&self, registry: &Registry<'_>) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            let mut names = [""; MAX_APPS];
            s.count = registry.names(&mut names);
            s.names = names;
        });
    }

    /// Align with the dispatcher's cursor without redrawing (boot).
    pub fn sync_cursor(&self, cursor: usize) {
        self.state.lock(|s| s.borrow_mut().cursor = cursor);
    }

    pub fn cursor(&self) -> usize {
        self.state.lock(|s| s.borrow().cursor)
    }

    pub fn is_running(&self) -> bool {
        self.state.lock(|s| s.borrow().running)
    }

    pub fn is_visible(&self) -> bool {
        self.state.lock(|s| {
            let s = s.borrow();
            s.running && s.visible
        })
    }

    /// Name under the cursor; `None` while the cursor rests on home.
    pub fn highlighted(&self) -> Option<&'static str> {
        self.state.lock(|s| {
            let s = s.borrow();
            (s.cursor > 0 && s.cursor < s.count).then(|| s.names[s.cursor])
        })
    }

    fn render(&self) {
        self.state.lock(|s| {
            let s = s.borrow();
            if !(s.running && s.visible) {
                return;
            }
            match s.names.get(s.cursor).filter(|_| s.cursor > 0 && s.cursor < s.count) {
                Some(name) => info!("menu: [{}/{}] > {}", s.cursor, s.count - 1, name),
                None => info!("menu: {} apps, press up/down", s.count.saturating_sub(1)),
            }
        });
    }
}

impl App for MenuApp {
    fn capabilities(&self) -> Capabilities {
        Capabilities::Full
    }

    fn init(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.running = true;
            s.visible = true;
        });
        self.render();
    }

    fn deinit(&self) {
        self.state.lock(|s| s.borrow_mut().running = false);
    }

    fn hide(&self) {
        self.state.lock(|s| s.borrow_mut().visible = false);
    }

    fn show(&self) {
        self.state.lock(|s| s.borrow_mut().visible = true);
        self.render();
    }

    fn on_event(&self, event: HmiEvent) {
        // menu click redraws the list; cursor moves arrive via on_cursor
        if event == HmiEvent::MenuClick {
            self.render();
        }
    }

    fn on_cursor(&self, index: usize) {
        self.sync_cursor(index);
        self.render();
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::AtomicU32;

    use super::*;
    use crate::apps::AppDescriptor;
    use crate::apps::transfer::TransferApp;
    use crate::kernel::config::LauncherConfig;
    use crate::kernel::dispatcher::Dispatcher;
    use crate::kernel::event::{AppInbox, DispatchInbox};
    use crate::kernel::launcher::Launcher;
    use crate::kernel::retained::{ResetCause, SelectionStore};

    #[test]
    fn highlight_follows_dispatcher_even_when_inbox_is_full() {
        let menu = MenuApp::new();
        let a = TransferApp::new();
        let b = TransferApp::new();
        let menu_inbox = AppInbox::new();
        let apps = [
            AppDescriptor::new("menu", &menu).with_inbox(menu_inbox.dyn_sender()),
            AppDescriptor::new("copy a", &a),
            AppDescriptor::new("copy b", &b),
        ];
        let reg = Registry::new(&apps).unwrap();
        menu.set_entries(&reg);

        let cell = AtomicU32::new(0);
        let store = SelectionStore::recover(&cell, ResetCause::PowerOn, reg.len());
        let inbox = DispatchInbox::new();
        let mut d = Dispatcher::new(Launcher::new(reg, store), &inbox, LauncherConfig::new());
        let _ = d.boot();
        assert!(menu.is_visible());
        assert_eq!(menu.highlighted(), None);

        // nobody drains the menu inbox, so these copies are lost
        for _ in 0..4 {
            let _ = d.handle(HmiEvent::MenuLongPress);
        }
        let _ = d.handle(HmiEvent::Up);
        assert_eq!(menu.highlighted(), Some("copy a"));
        let _ = d.handle(HmiEvent::Down);
        assert_eq!(menu.highlighted(), Some("copy b"));
        assert_eq!(menu.cursor(), d.selected());

        // broadcast up/down alone never moves the highlight
        menu.on_event(HmiEvent::Up);
        assert_eq!(menu.cursor(), 2);
    }

    #[test]
    fn hide_show_and_deinit() {
        let menu = MenuApp::new();
        menu.init();
        menu.hide();
        assert!(menu.is_running());
        assert!(!menu.is_visible());
        menu.show();
        assert!(menu.is_visible());
        menu.deinit();
        assert!(!menu.is_running());
        assert!(!menu.is_visible());
    }
}
