//! Platform-agnostic Wii Nunchuk polling driver.
//!
//! This crate talks to a Nunchuk over any blocking `embedded-hal` I2C bus and
//! republishes its state as input events through traits implemented by the
//! host. It has no platform-specific dependencies and runs both in embedded
//! `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! - [`registers`]: Register map, handshake bytes, bit masks, timing constants
//! - [`frame`]: [`RawFrame`] and the pure [`decode`] into [`DeviceRegisters`]
//! - [`transport`]: [`Transport`] trait and the [`I2cTransport`] adapter
//! - [`timing`]: Jittered blocking settle delays ([`SettleDelay`])
//! - [`protocol`]: [`handshake`] and the timed [`read_frame`]
//! - [`input`]: Host traits ([`InputSubsystem`], [`EventSink`], [`PollScheduler`])
//! - [`device`]: The [`Nunchuk`] attach/poll/detach lifecycle
//! - [`registry`]: Driver identification and matching ([`DriverRegistry`])
//! - [`config`]: [`NunchukConfig`]
//!
//! # Protocol
//!
//! ```text
//! attach: write F0 55, write FB 00            (unencrypted mode)
//! read:   settle, write 00, settle, read 6    (settle = 10-20 ms)
//! ```
//!
//! # Example
//!
//! ```rust
//! use nunchuk_core::{decode, RawFrame};
//!
//! let regs = decode(&RawFrame::new([0x10, 0x20, 0x01, 0x02, 0x03, 0x00]));
//! assert_eq!((regs.x, regs.y), (16, 32));
//! assert_eq!(regs.acceleration(), (4, 8, 12));
//! // Buttons are active-low on the wire
//! assert!(regs.z_pressed && regs.c_pressed);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting and logging (for embedded targets)
//! - **`log`**: Log through the `log` facade
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible to every module
#[macro_use]
mod fmt;

pub mod config;
pub mod device;
pub mod error;
pub mod frame;
pub mod input;
pub mod protocol;
pub mod registers;
pub mod registry;
pub mod timing;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export main types at crate root
pub use config::NunchukConfig;
pub use device::{publish, DeviceHandle, LifecycleState, Nunchuk};
pub use error::{
    AllocationError, AttachError, BusOp, DriverError, RegistrationError, TransportError,
};
pub use frame::{decode, DeviceRegisters, RawFrame};
pub use input::{
    AbsInfo, Axis, BusType, EventSink, InputDescriptor, InputSubsystem, Key, PollScheduler,
};
pub use protocol::{handshake, read_frame, read_registers};
pub use registry::{DriverInfo, DriverRegistry, NUNCHUK_DRIVER};
pub use timing::{SettleDelay, SettleWindow};
pub use transport::{I2cTransport, Transport};
