//! Driver identification and the host's driver table.
//!
//! The host builds one [`DriverRegistry`] at startup, registers the drivers
//! it ships, and consults it when a device shows up, either by its hardware
//! description ("compatible" string) or by its bus-level identifier.

use heapless::Vec;

use crate::error::RegistrationError;

/// Static identification of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverInfo {
    /// Driver name.
    pub name: &'static str,
    /// Hardware description strings this driver binds to.
    pub compatible: &'static [&'static str],
    /// Bus-level device identifiers this driver binds to.
    pub ids: &'static [&'static str],
}

impl DriverInfo {
    #[must_use]
    pub fn is_compatible(&self, compatible: &str) -> bool {
        self.compatible.iter().any(|c| *c == compatible)
    }

    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|i| *i == id)
    }
}

/// The Nunchuk driver.
pub const NUNCHUK_DRIVER: DriverInfo = DriverInfo {
    name: "wiichuk_i2c",
    compatible: &["nintendo,nunchuk"],
    ids: &["wiichuk_i2c"],
};

/// Fixed-capacity table of known drivers.
pub struct DriverRegistry<const N: usize> {
    drivers: Vec<&'static DriverInfo, N>,
}

impl<const N: usize> DriverRegistry<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drivers: Vec::new(),
        }
    }

    /// Add a driver. Names must be unique.
    pub fn register(&mut self, driver: &'static DriverInfo) -> Result<(), RegistrationError> {
        if self.drivers.iter().any(|d| d.name == driver.name) {
            return Err(RegistrationError::AlreadyRegistered);
        }
        self.drivers
            .push(driver)
            .map_err(|_| RegistrationError::NoSlot)
    }

    /// Remove a driver by name. Returns whether it was present.
    pub fn unregister(&mut self, name: &str) -> bool {
        match self.drivers.iter().position(|d| d.name == name) {
            Some(index) => {
                self.drivers.swap_remove(index);
                true
            }
            None => false,
        }
    }

    /// First driver bound to a hardware description string.
    #[must_use]
    pub fn match_compatible(&self, compatible: &str) -> Option<&'static DriverInfo> {
        self.drivers
            .iter()
            .copied()
            .find(|d| d.is_compatible(compatible))
    }

    /// First driver bound to a bus-level identifier.
    #[must_use]
    pub fn match_id(&self, id: &str) -> Option<&'static DriverInfo> {
        self.drivers.iter().copied().find(|d| d.has_id(id))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}

impl<const N: usize> Default for DriverRegistry<N> {
    fn default() -> Self {
        Self::new()
    }
}
