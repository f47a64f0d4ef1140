//! Host input subsystem traits and the device description handed to it.
//!
//! The driver never owns an event queue or a timer. The host provides:
//!
//! - an [`InputSubsystem`] that allocates and registers event sinks,
//! - an [`EventSink`] per registered device that receives key and axis events,
//! - a [`PollScheduler`] that calls [`Nunchuk::poll`](crate::Nunchuk::poll)
//!   at a fixed cadence while armed.

use crate::error::{AllocationError, RegistrationError};
use crate::registers::{AXIS_FLAT, AXIS_FUZZ, AXIS_MAX, AXIS_MIN, POLL_INTERVAL_MS};

/// Buttons reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Key {
    /// Z button (the large trigger).
    Z,
    /// C button (the small round one).
    C,
}

impl Key {
    /// Linux input event code (`BTN_Z` / `BTN_C`).
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Key::Z => 0x135,
            Key::C => 0x132,
        }
    }
}

/// Absolute axes reported by the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Linux input event code (`ABS_X` / `ABS_Y`).
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Axis::X => 0x00,
            Axis::Y => 0x01,
        }
    }
}

/// Range and filtering parameters of one absolute axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbsInfo {
    pub axis: Axis,
    pub min: i32,
    pub max: i32,
    /// Noise band the host may filter out.
    pub fuzz: i32,
    /// Dead zone around the center.
    pub flat: i32,
}

impl AbsInfo {
    /// Joystick axis: 0-255, fuzz 4, flat 8.
    #[must_use]
    pub const fn joystick(axis: Axis) -> Self {
        Self {
            axis,
            min: AXIS_MIN,
            max: AXIS_MAX,
            fuzz: AXIS_FUZZ,
            flat: AXIS_FLAT,
        }
    }
}

/// Bus the input device sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusType {
    I2c,
}

/// Everything the host needs to expose the device as an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InputDescriptor {
    pub name: &'static str,
    pub bus: BusType,
    pub keys: &'static [Key],
    pub axes: &'static [AbsInfo],
    pub poll_interval_ms: u32,
}

const NUNCHUK_KEYS: [Key; 2] = [Key::C, Key::Z];
const NUNCHUK_AXES: [AbsInfo; 2] = [AbsInfo::joystick(Axis::X), AbsInfo::joystick(Axis::Y)];

impl InputDescriptor {
    /// Descriptor of the Nunchuk input device.
    pub const NUNCHUK: Self = Self {
        name: "Nintendo Wiichuk",
        bus: BusType::I2c,
        keys: &NUNCHUK_KEYS,
        axes: &NUNCHUK_AXES,
        poll_interval_ms: POLL_INTERVAL_MS,
    };

    /// Same descriptor with a different poll interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Look up the parameters of `axis`.
    #[must_use]
    pub fn axis(&self, axis: Axis) -> Option<&AbsInfo> {
        self.axes.iter().find(|info| info.axis == axis)
    }
}

/// Receives the events of one registered input device.
///
/// A batch of events is coherent only once [`sync`](EventSink::sync) is
/// called; hosts should not expose a partial batch.
pub trait EventSink {
    fn report_key(&mut self, key: Key, pressed: bool);

    fn report_abs(&mut self, axis: Axis, value: i32);

    /// End of one coherent event batch.
    fn sync(&mut self);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    #[inline]
    fn report_key(&mut self, key: Key, pressed: bool) {
        S::report_key(self, key, pressed)
    }

    #[inline]
    fn report_abs(&mut self, axis: Axis, value: i32) {
        S::report_abs(self, axis, value)
    }

    #[inline]
    fn sync(&mut self) {
        S::sync(self)
    }
}

/// Host input subsystem.
pub trait InputSubsystem {
    /// Per-device event sink handed out by [`allocate`](Self::allocate).
    type Device: EventSink;

    /// Reserve an input device.
    fn allocate(&mut self) -> Result<Self::Device, AllocationError>;

    /// Make an allocated device visible as an input source.
    fn register(
        &mut self,
        device: &mut Self::Device,
        descriptor: &InputDescriptor,
    ) -> Result<(), RegistrationError>;

    /// Remove a registered device and free it.
    fn unregister(&mut self, device: Self::Device);

    /// Free a device that was allocated but never registered.
    fn release(&mut self, device: Self::Device);
}

/// Host timer that drives polling.
///
/// After [`disarm`](Self::disarm) returns, no new poll may begin.
pub trait PollScheduler {
    fn arm(&mut self, interval_ms: u32);

    fn disarm(&mut self);
}
