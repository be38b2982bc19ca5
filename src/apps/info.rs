// Information pages (storage, chip, network).
//
// Static text supplied at build time, scrolled with up/down while the
// page is up. These pages poke global peripherals they never give back,
// so they are registered with a restart after deinit.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use log::info;

use crate::apps::{App, Capabilities};
use crate::kernel::event::HmiEvent;

/// Lines shown at once.
pub const VISIBLE_LINES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoPage {
    Storage,
    Chip,
    Network,
}

impl InfoPage {
    pub const fn title(self) -> &'static str {
        match self {
            InfoPage::Storage => "Info SD",
            InfoPage::Chip => "Info Esp",
            InfoPage::Network => "Info Wlan",
        }
    }
}

#[derive(Clone, Copy)]
struct PageState {
    running: bool,
    scroll: usize,
    ignored: u32,
}

pub struct InfoApp {
    page: InfoPage,
    lines: &'static [&'static str],
    state: Mutex<CriticalSectionRawMutex, RefCell<PageState>>,
}

impl InfoApp {
    pub const fn new(page: InfoPage, lines: &'static [&'static str]) -> Self {
        Self {
            page,
            lines,
            state: Mutex::new(RefCell::new(PageState {
                running: false,
                scroll: 0,
                ignored: 0,
            })),
        }
    }

    pub fn page(&self) -> InfoPage {
        self.page
    }

    pub fn scroll(&self) -> usize {
        self.state.lock(|s| s.borrow().scroll)
    }

    /// Broadcast events seen while this page was not up.
    pub fn ignored(&self) -> u32 {
        self.state.lock(|s| s.borrow().ignored)
    }

    fn max_scroll(&self) -> usize {
        self.lines.len().saturating_sub(VISIBLE_LINES)
    }

    /// Lines currently on screen.
    pub fn window(&self) -> &'static [&'static str] {
        let start = self.scroll().min(self.lines.len());
        let end = (start + VISIBLE_LINES).min(self.lines.len());
        &self.lines[start..end]
    }

    fn render(&self) {
        info!("{}:", self.page.title());
        for line in self.window() {
            info!("  {}", line);
        }
    }
}

impl App for InfoApp {
    fn capabilities(&self) -> Capabilities {
        Capabilities::InitDeinit
    }

    fn init(&self) {
        self.state.lock(|s| {
            let mut s = s.borrow_mut();
            s.running = true;
            s.scroll = 0;
        });
        self.render();
    }

    fn deinit(&self) {
        self.state.lock(|s| s.borrow_mut().running = false);
    }

    fn on_event(&self, event: HmiEvent) {
        let max = self.max_scroll();
        let changed = self.state.lock(|s| {
            let mut s = s.borrow_mut();
            if !s.running {
                s.ignored = s.ignored.wrapping_add(1);
                return false;
            }
            let next = match event {
                HmiEvent::Up => s.scroll.saturating_sub(1),
                HmiEvent::Down => (s.scroll + 1).min(max),
                _ => return false,
            };
            let changed = next != s.scroll;
            s.scroll = next;
            changed
        });
        if changed {
            self.render();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static LINES: [&str; 8] = ["a", "b", "c", "d", "e", "f", "g", "h"];

    #[test]
    fn scrolls_only_while_up() {
        let app = InfoApp::new(InfoPage::Chip, &LINES);
        app.on_event(HmiEvent::Down);
        assert_eq!(app.scroll(), 0);
        assert_eq!(app.ignored(), 1);

        app.init();
        app.on_event(HmiEvent::Down);
        app.on_event(HmiEvent::Down);
        app.on_event(HmiEvent::Down);
        assert_eq!(app.scroll(), 2);
        assert_eq!(app.window(), &LINES[2..8]);

        app.on_event(HmiEvent::Up);
        assert_eq!(app.window()[0], "b");

        app.deinit();
        app.init();
        assert_eq!(app.scroll(), 0);
    }

    #[test]
    fn short_page_never_scrolls() {
        static SHORT: [&str; 2] = ["one", "two"];
        let app = InfoApp::new(InfoPage::Storage, &SHORT);
        app.init();
        app.on_event(HmiEvent::Down);
        assert_eq!(app.scroll(), 0);
        assert_eq!(app.window(), &SHORT[..]);
        assert_eq!(app.page().title(), "Info SD");
    }
}
