//! Bus transport trait and the `embedded-hal` I2C adapter.

use embedded_hal::i2c::I2c;

use crate::error::{BusOp, TransportError};
use crate::registers::DEFAULT_ADDRESS;

/// Blocking byte transport to a single bus endpoint.
///
/// The endpoint owns addressing: implementations know which device they talk
/// to, the driver only exchanges payloads. Bus-level retries, if any, belong
/// here and not in the driver.
pub trait Transport {
    /// Write `bytes` to the device.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;

    /// Fill `buffer` completely from the device.
    fn recv(&mut self, buffer: &mut [u8]) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    #[inline]
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        T::send(self, bytes)
    }

    #[inline]
    fn recv(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        T::recv(self, buffer)
    }
}

/// [`Transport`] over an `embedded-hal` I2C bus at a fixed 7-bit address.
///
/// Uses separate `write()` and `read()` transactions: the Nunchuk needs time
/// between selecting the register and returning data, which a repeated-start
/// `write_read()` does not leave.
pub struct I2cTransport<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cTransport<I2C> {
    /// Create a transport for the device at `address`.
    #[must_use]
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Create a transport for a Nunchuk at its default address (0x52).
    #[must_use]
    pub fn with_default_address(i2c: I2C) -> Self {
        Self::new(i2c, DEFAULT_ADDRESS)
    }

    #[inline]
    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the underlying bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c> Transport for I2cTransport<I2C> {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        self.i2c
            .write(self.address, bytes)
            .map_err(|e| TransportError::from_bus(BusOp::Send, &e))
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        self.i2c
            .read(self.address, buffer)
            .map_err(|e| TransportError::from_bus(BusOp::Recv, &e))
    }
}
