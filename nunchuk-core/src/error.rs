//! Error types for the driver.
//!
//! Attach-time failures are reported through [`AttachError`], which records
//! the lifecycle stage that failed. Poll-time failures never leave the tick
//! that produced them.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

use crate::device::LifecycleState;

/// Bus operation that produced a [`TransportError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusOp {
    /// Write to the device.
    Send,
    /// Read from the device.
    Recv,
}

impl BusOp {
    /// Operation name as used in log output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            BusOp::Send => "send",
            BusOp::Recv => "recv",
        }
    }
}

/// A failed send or receive on the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransportError {
    pub op: BusOp,
    pub kind: ErrorKind,
}

impl TransportError {
    #[must_use]
    pub const fn new(op: BusOp, kind: ErrorKind) -> Self {
        Self { op, kind }
    }

    /// Build from any `embedded-hal` I2C error.
    pub fn from_bus<E: embedded_hal::i2c::Error>(op: BusOp, err: &E) -> Self {
        Self::new(op, err.kind())
    }

    /// Errno-style numeric code for the failure.
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self.kind {
            ErrorKind::NoAcknowledge(_) => -6, // ENXIO
            ErrorKind::ArbitrationLoss => -11, // EAGAIN
            ErrorKind::Overrun => -75,         // EOVERFLOW
            _ => -5,                           // EIO
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {} ({})", self.op.name(), self.code(), self.kind)
    }
}

/// The host could not provide an input device for this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AllocationError;

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("allocation failed")
    }
}

/// Registration with the host input subsystem or a driver registry failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    /// The slot is already taken by an identical registration.
    AlreadyRegistered,
    /// No capacity left.
    NoSlot,
    /// The host refused the descriptor.
    Rejected,
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::AlreadyRegistered => f.write_str("already registered"),
            RegistrationError::NoSlot => f.write_str("no registration slot left"),
            RegistrationError::Rejected => f.write_str("registration rejected"),
        }
    }
}

/// Any driver error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriverError {
    Transport(TransportError),
    Allocation(AllocationError),
    Registration(RegistrationError),
    /// Operation not valid in the current lifecycle state.
    InvalidState(LifecycleState),
}

impl From<TransportError> for DriverError {
    fn from(err: TransportError) -> Self {
        DriverError::Transport(err)
    }
}

impl From<AllocationError> for DriverError {
    fn from(err: AllocationError) -> Self {
        DriverError::Allocation(err)
    }
}

impl From<RegistrationError> for DriverError {
    fn from(err: RegistrationError) -> Self {
        DriverError::Registration(err)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Transport(e) => write!(f, "transport: {}", e),
            DriverError::Allocation(e) => write!(f, "input device: {}", e),
            DriverError::Registration(e) => write!(f, "input device: {}", e),
            DriverError::InvalidState(s) => write!(f, "not allowed while {}", s),
        }
    }
}

/// Failed attach, with the stage the lifecycle was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttachError {
    pub stage: LifecycleState,
    pub error: DriverError,
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attach failed while {}: {}", self.stage, self.error)
    }
}
