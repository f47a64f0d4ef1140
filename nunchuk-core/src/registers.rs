//! Nunchuk register map and protocol constants.
//!
//! The controller exposes its complete state as a single 6-byte block at
//! register `0x00`:
//!
//! | Byte | Bits | Content |
//! |------|------|---------|
//! | 0    | 7..0 | Joystick X |
//! | 1    | 7..0 | Joystick Y |
//! | 2    | 7..0 | Acceleration X, bits 9..2 |
//! | 3    | 7..0 | Acceleration Y, bits 9..2 |
//! | 4    | 7..0 | Acceleration Z, bits 9..2 |
//! | 5    | 7..6 | Acceleration Z, bits 1..0 |
//! | 5    | 5..4 | Acceleration Y, bits 1..0 |
//! | 5    | 3..2 | Acceleration X, bits 1..0 |
//! | 5    | 1    | C button, 0 = pressed |
//! | 5    | 0    | Z button, 0 = pressed |

// ---------------------------------------------------------------------------
// Bus
// ---------------------------------------------------------------------------

/// Default 7-bit I2C address of the Nunchuk.
pub const DEFAULT_ADDRESS: u8 = 0x52;

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// First handshake write: disables encryption.
pub const HANDSHAKE_INIT: [u8; 2] = [0xF0, 0x55];

/// Second handshake write: selects unencrypted reporting.
pub const HANDSHAKE_UNENCRYPTED: [u8; 2] = [0xFB, 0x00];

// ---------------------------------------------------------------------------
// State register
// ---------------------------------------------------------------------------

/// Address of the register holding the complete device state.
pub const REG_STATE: u8 = 0x00;

/// Size of the state block in bytes.
pub const FRAME_LEN: usize = 6;

/// Z button, byte 5 bit 0. Clear when pressed.
pub const BUTTON_Z_MASK: u8 = 0b0000_0001;

/// C button, byte 5 bit 1. Clear when pressed.
pub const BUTTON_C_MASK: u8 = 0b0000_0010;

/// Acceleration X low bits, byte 5 bits 3..2.
pub const ACC_X_LOW_MASK: u8 = 0b0000_1100;
pub const ACC_X_LOW_SHIFT: u32 = 2;

/// Acceleration Y low bits, byte 5 bits 5..4.
pub const ACC_Y_LOW_MASK: u8 = 0b0011_0000;
pub const ACC_Y_LOW_SHIFT: u32 = 4;

/// Acceleration Z low bits, byte 5 bits 7..6.
pub const ACC_Z_LOW_MASK: u8 = 0b1100_0000;
pub const ACC_Z_LOW_SHIFT: u32 = 6;

/// Shift applied to the acceleration high byte to make room for the low bits.
pub const ACC_HIGH_SHIFT: u32 = 2;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Lower bound of each settle delay in microseconds.
pub const SETTLE_MIN_US: u32 = 10_000;

/// Upper bound of each settle delay in microseconds.
pub const SETTLE_MAX_US: u32 = 20_000;

/// Nominal poll interval in milliseconds.
pub const POLL_INTERVAL_MS: u32 = 5;

// ---------------------------------------------------------------------------
// Joystick axes as seen by the input subsystem
// ---------------------------------------------------------------------------

pub const AXIS_MIN: i32 = 0;
pub const AXIS_MAX: i32 = 255;
pub const AXIS_FUZZ: i32 = 4;
pub const AXIS_FLAT: i32 = 8;
