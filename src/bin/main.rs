// otg-launcher entry point
//
// Boot sequence: logger -> HAL -> RTOS -> reset cause -> registry ->
// retained selection -> reader tasks -> home (+ auto-resume) -> dispatch
//
// Apps, inboxes and the dispatcher inbox are statics; descriptors need
// runtime `dyn_sender()` handles so they live in a StaticCell. The
// dispatcher runs in this task and only returns to ask for a restart,
// which is always a software reset so the selection survives it.
// A panic takes the same reset, with the selection forced to home.

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::timer::timg::TimerGroup;
use log::{error, info};
use static_cell::StaticCell;

use otg_launcher::apps::{AppDescriptor, InfoApp, InfoPage, MenuApp, Registry, TransferApp};
use otg_launcher::board::{self, Board, RtcSlot};
use otg_launcher::kernel::tasks::{inbox_task, input_task};
use otg_launcher::kernel::{
    AppInbox, DispatchInbox, Dispatcher, InputPort, Launcher, LauncherConfig, Outcome,
    SelectionStore,
};

esp_bootloader_esp_idf::esp_app_desc!();

const APP_COUNT: usize = 5;

static SD_LINES: [&str; 4] = [
    "SD card on SDIO 4-bit",
    "mount point /sdcard",
    "copy source /sdcard/config",
    "hot-plug: no",
];

static CHIP_LINES: [&str; 7] = [
    "chip esp32s3",
    "cores 2 (Xtensa LX7)",
    "cpu clock 240 MHz",
    "flash 8 MB",
    "psram none",
    "usb otg full-speed",
    concat!("fw ", env!("CARGO_PKG_VERSION")),
];

static WLAN_LINES: [&str; 3] = ["radio 2.4 GHz b/g/n", "mode station", "not connected"];

static MENU: MenuApp = MenuApp::new();
static INFO_SD: InfoApp = InfoApp::new(InfoPage::Storage, &SD_LINES);
static INFO_ESP: InfoApp = InfoApp::new(InfoPage::Chip, &CHIP_LINES);
static INFO_WLAN: InfoApp = InfoApp::new(InfoPage::Network, &WLAN_LINES);
static TRANSFER: TransferApp = TransferApp::new();

static MENU_INBOX: AppInbox = AppInbox::new();
static INFO_SD_INBOX: AppInbox = AppInbox::new();
static INFO_ESP_INBOX: AppInbox = AppInbox::new();
static INFO_WLAN_INBOX: AppInbox = AppInbox::new();
static TRANSFER_INBOX: AppInbox = AppInbox::new();

static DISPATCH_INBOX: DispatchInbox = DispatchInbox::new();
static INPUT_PORT: InputPort<'static> = InputPort::new(&DISPATCH_INBOX);

static RETAINED: RtcSlot = RtcSlot::Selection;
static DESCRIPTORS: StaticCell<[AppDescriptor<'static>; APP_COUNT]> = StaticCell::new();

// esp-backtrace (`custom-halt`) calls this after printing the panic.
#[unsafe(no_mangle)]
pub fn custom_halt() -> ! {
    board::halt_and_restart()
}

fn print_banner() {
    info!(
        "{} v{} (esp32s3, cpu {:?})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        CpuClock::max()
    );
    info!(
        "inboxes: dispatcher {}, app {}",
        otg_launcher::kernel::event::DISPATCH_INBOX_CAP,
        otg_launcher::kernel::event::APP_INBOX_CAP
    );
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    esp_println::logger::init_logger_from_env();
    print_banner();

    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    let cause = board::reset_cause();

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    esp_rtos::start(timg0.timer0);
    info!("rtos started.");

    let board = Board::init(peripherals);
    info!("hardware initialized.");

    let apps: &'static [AppDescriptor<'static>] = DESCRIPTORS.init([
        AppDescriptor::new("Menu", &MENU).with_inbox(MENU_INBOX.dyn_sender()),
        AppDescriptor::new(InfoPage::Storage.title(), &INFO_SD)
            .with_inbox(INFO_SD_INBOX.dyn_sender())
            .restart_after_deinit(),
        AppDescriptor::new(InfoPage::Chip.title(), &INFO_ESP)
            .with_inbox(INFO_ESP_INBOX.dyn_sender())
            .restart_after_deinit(),
        AppDescriptor::new(InfoPage::Network.title(), &INFO_WLAN)
            .with_inbox(INFO_WLAN_INBOX.dyn_sender())
            .restart_after_deinit(),
        AppDescriptor::new("Config Copy", &TRANSFER).with_inbox(TRANSFER_INBOX.dyn_sender()),
    ]);

    let registry = match Registry::new(apps) {
        Ok(r) => r,
        Err(e) => {
            error!("registry rejected: {}", e);
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };

    let store = SelectionStore::recover(&RETAINED, cause, registry.len());
    let launcher = Launcher::new(registry, store);
    let mut dispatcher = Dispatcher::new(launcher, &DISPATCH_INBOX, LauncherConfig::new());

    MENU.set_entries(&registry);
    MENU.sync_cursor(dispatcher.selected());

    spawner.spawn(inbox_task("menu", &MENU_INBOX, &MENU)).unwrap();
    spawner.spawn(inbox_task("info sd", &INFO_SD_INBOX, &INFO_SD)).unwrap();
    spawner.spawn(inbox_task("info esp", &INFO_ESP_INBOX, &INFO_ESP)).unwrap();
    spawner.spawn(inbox_task("info wlan", &INFO_WLAN_INBOX, &INFO_WLAN)).unwrap();
    spawner.spawn(inbox_task("transfer", &TRANSFER_INBOX, &TRANSFER)).unwrap();
    spawner.spawn(input_task(board.buttons, &INPUT_PORT)).unwrap();
    info!("tasks spawned.");

    if let Outcome::Restart(reason) = dispatcher.boot() {
        board::reboot(reason);
    }
    info!("launcher ready.");

    let reason = dispatcher.run().await;
    info!(
        "dispatcher: {} events handled, {} fan-out drops, {} input drops",
        dispatcher.stats().handled,
        dispatcher.stats().fanout_dropped,
        INPUT_PORT.dropped()
    );
    board::reboot(reason)
}
