//! ESP32-S3-USB-OTG Board Support Package (BSP)
//!
//! Maps the four front-panel buttons, the reset reason register and two
//! words of RTC fast memory onto launcher types, so the kernel never sees
//! a GPIO number or a chip register.
//!
//! GPIO |  Function   |  Notes
//! -----+-------------+-------------------------------
//!  0   | Button OK   | Active LOW, internal pullup (also strapping/boot)
//! 10   | Button UP   | Active LOW, internal pullup
//! 11   | Button DW   | Active LOW, internal pullup
//! 14   | Button MENU | Active LOW, internal pullup
//! 43   | UART0 TX    | Log output (esp-println)

pub mod button;

pub use button::Button;

#[cfg(feature = "board")]
pub use device::{Board, ButtonsHw, RtcSlot, halt_and_restart, reboot, reset_cause};

#[cfg(feature = "board")]
mod device {
    use esp_hal::gpio::{Input, InputConfig, Pull};
    use esp_hal::peripherals::Peripherals;
    use esp_hal::rtc_cntl::{SocResetReason, reset_reason};
    use esp_hal::system::Cpu;
    use log::{info, warn};

    use super::button::Button;
    use crate::kernel::launcher::RestartReason;
    use crate::kernel::retained::{self, ResetCause, RetainedCell};

    // Both survive software and watchdog resets; garbage after power-on,
    // which `SelectionStore::recover` and `take_fault` handle.
    #[esp_hal::ram(unstable(rtc_fast, persistent))]
    static mut SELECTED_APP: u32 = 0;

    #[esp_hal::ram(unstable(rtc_fast, persistent))]
    static mut FAULT_MARK: u32 = 0;

    /// One retained word in RTC fast memory.
    ///
    /// Written by the dispatcher task, or by the panic path after
    /// everything else has stopped.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum RtcSlot {
        Selection,
        FaultMark,
    }

    impl RtcSlot {
        fn word(self) -> *mut u32 {
            match self {
                RtcSlot::Selection => &raw mut SELECTED_APP,
                RtcSlot::FaultMark => &raw mut FAULT_MARK,
            }
        }
    }

    impl RetainedCell for RtcSlot {
        fn read(&self) -> u32 {
            unsafe { core::ptr::read_volatile(self.word()) }
        }

        fn write(&self, value: u32) {
            unsafe { core::ptr::write_volatile(self.word(), value) }
        }
    }

    pub fn reset_cause() -> ResetCause {
        let raw = reset_reason(Cpu::ProCpu);
        let cause = match raw {
            Some(SocResetReason::ChipPowerOn) => ResetCause::PowerOn,
            Some(SocResetReason::CoreSw) | Some(SocResetReason::CpuSw) => ResetCause::Software,
            Some(SocResetReason::CoreDeepSleep) => ResetCause::DeepSleep,
            Some(SocResetReason::CoreMwdt0)
            | Some(SocResetReason::CoreRtcWdt)
            | Some(SocResetReason::SysRtcWdt) => ResetCause::Watchdog,
            _ => ResetCause::Other,
        };
        let cause = retained::take_fault(cause, &RtcSlot::FaultMark);
        info!("reset reason {:?} -> {:?}", raw, cause);
        cause
    }

    /// Reboot through a software reset so RTC fast memory is kept.
    pub fn reboot(reason: RestartReason) -> ! {
        warn!("restart: {}", reason);
        esp_hal::system::software_reset()
    }

    /// Panic exit: home comes up next, never the app that faulted.
    pub fn halt_and_restart() -> ! {
        retained::mark_fault(&RtcSlot::Selection, &RtcSlot::FaultMark);
        esp_hal::system::software_reset()
    }

    /// Front-panel buttons, all active LOW.
    pub struct ButtonsHw {
        pub ok: Input<'static>,
        pub up: Input<'static>,
        pub down: Input<'static>,
        pub menu: Input<'static>,
    }

    impl ButtonsHw {
        /// First pressed button in `Button::ALL` scan order.
        pub fn read_pressed(&self) -> Option<Button> {
            Button::ALL.into_iter().find(|&b| self.pin(b).is_low())
        }

        fn pin(&self, button: Button) -> &Input<'static> {
            match button {
                Button::Ok => &self.ok,
                Button::Up => &self.up,
                Button::Down => &self.down,
                Button::Menu => &self.menu,
            }
        }
    }

    /// Complete board hardware, ready for task start.
    pub struct Board {
        pub buttons: ButtonsHw,
    }

    impl Board {
        pub fn init(p: Peripherals) -> Self {
            let cfg = InputConfig::default().with_pull(Pull::Up);
            let buttons = ButtonsHw {
                ok: Input::new(p.GPIO0, cfg),
                up: Input::new(p.GPIO10, cfg),
                down: Input::new(p.GPIO11, cfg),
                menu: Input::new(p.GPIO14, cfg),
            };
            Board { buttons }
        }
    }
}
