//! Wii Nunchuk to USB joystick for RP2040.
//!
//! This crate binds the platform-agnostic `nunchuk-core` driver to the
//! RP2040: the Nunchuk is polled over blocking I2C on a 5 ms embassy ticker
//! and every published frame is forwarded as a USB HID joystick report.

#![no_std]

// Re-export core types for convenience
pub use nunchuk_core::{
    decode, AttachError, DeviceRegisters, DriverError, DriverRegistry, I2cTransport,
    InputDescriptor, LifecycleState, Nunchuk, NunchukConfig, RawFrame, NUNCHUK_DRIVER,
};

pub mod host;
pub mod usb_output;

pub use host::{ReportSignal, SignalInput, SignalSink, TickScheduler};
pub use usb_output::{configure_usb_hid, NunchukReport, UsbHidOutput};
