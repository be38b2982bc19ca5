// Single-active-app launcher for the ESP32-S3-USB-OTG board (four buttons, one LCD)

#![cfg_attr(not(test), no_std)]

pub mod apps;
pub mod board;
pub mod drivers;
pub mod kernel;
