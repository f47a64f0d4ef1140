//! Raw state frames and their decoded register view.

use core::fmt;

use crate::registers::{
    ACC_HIGH_SHIFT, ACC_X_LOW_MASK, ACC_X_LOW_SHIFT, ACC_Y_LOW_MASK, ACC_Y_LOW_SHIFT,
    ACC_Z_LOW_MASK, ACC_Z_LOW_SHIFT, BUTTON_C_MASK, BUTTON_Z_MASK, FRAME_LEN,
};

/// The 6-byte state block read from register `0x00`.
///
/// A frame is captured once per poll cycle and never modified afterwards.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame(pub [u8; FRAME_LEN]);

impl RawFrame {
    #[must_use]
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    #[inline]
    #[must_use]
    pub const fn bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Decode this frame. See [`decode`].
    #[inline]
    pub fn decode(&self) -> DeviceRegisters {
        decode(self)
    }
}

impl From<[u8; FRAME_LEN]> for RawFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

/// Decoded Nunchuk state.
///
/// - `x`, `y`: joystick position, 0-255
/// - `x_acc`, `y_acc`, `z_acc`: 10-bit acceleration, 0-1023
/// - `z_pressed`, `c_pressed`: button state
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[must_use]
pub struct DeviceRegisters {
    pub x: u8,
    pub y: u8,
    pub x_acc: u16,
    pub y_acc: u16,
    pub z_acc: u16,
    pub z_pressed: bool,
    pub c_pressed: bool,
}

impl DeviceRegisters {
    /// Acceleration as an `(x, y, z)` tuple.
    #[inline]
    #[must_use]
    pub const fn acceleration(&self) -> (u16, u16, u16) {
        (self.x_acc, self.y_acc, self.z_acc)
    }
}

impl fmt::Display for DeviceRegisters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "x={} y={} x_acc={} y_acc={} z_acc={} c_pressed={} z_pressed={}",
            self.x, self.y, self.x_acc, self.y_acc, self.z_acc, self.c_pressed, self.z_pressed
        )
    }
}

/// Decode a raw frame into register values.
///
/// Total over all byte patterns: a garbage frame decodes to garbage
/// registers, nothing is validated. Button bits are active-low.
pub fn decode(frame: &RawFrame) -> DeviceRegisters {
    let [b0, b1, b2, b3, b4, b5] = frame.0;

    DeviceRegisters {
        x: b0,
        y: b1,
        x_acc: accel(b2, b5, ACC_X_LOW_MASK, ACC_X_LOW_SHIFT),
        y_acc: accel(b3, b5, ACC_Y_LOW_MASK, ACC_Y_LOW_SHIFT),
        z_acc: accel(b4, b5, ACC_Z_LOW_MASK, ACC_Z_LOW_SHIFT),
        z_pressed: (b5 & BUTTON_Z_MASK) == 0,
        c_pressed: (b5 & BUTTON_C_MASK) == 0,
    }
}

/// Compose a 10-bit acceleration from its high byte and two low bits.
#[inline]
const fn accel(high: u8, low: u8, mask: u8, shift: u32) -> u16 {
    ((high as u16) << ACC_HIGH_SHIFT) | ((low & mask) >> shift) as u16
}
