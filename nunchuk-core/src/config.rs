//! Driver configuration.

use crate::registers::{DEFAULT_ADDRESS, POLL_INTERVAL_MS};
use crate::timing::SettleWindow;

/// Compile-time tunables of one Nunchuk instance.
///
/// The defaults match the stock controller; there is normally no reason to
/// change anything but the address on boards with an address translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NunchukConfig {
    /// 7-bit bus address (used by [`I2cTransport`](crate::I2cTransport)).
    pub address: u8,
    /// Interval the host is asked to poll at.
    pub poll_interval_ms: u32,
    /// Range of each settle delay in the frame read.
    pub settle: SettleWindow,
}

impl NunchukConfig {
    pub const DEFAULT: Self = Self {
        address: DEFAULT_ADDRESS,
        poll_interval_ms: POLL_INTERVAL_MS,
        settle: SettleWindow::DEFAULT,
    };

    #[must_use]
    pub const fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    #[must_use]
    pub const fn with_settle(mut self, settle: SettleWindow) -> Self {
        self.settle = settle;
        self
    }
}

impl Default for NunchukConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
