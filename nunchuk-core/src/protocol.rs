//! Wire protocol: handshake and the timed two-phase state read.

use embedded_hal::delay::DelayNs;
use rand_core::RngCore;

use crate::error::TransportError;
use crate::frame::{DeviceRegisters, RawFrame};
use crate::registers::{FRAME_LEN, HANDSHAKE_INIT, HANDSHAKE_UNENCRYPTED, REG_STATE};
use crate::timing::SettleDelay;
use crate::transport::Transport;

/// Switch the device into unencrypted reporting mode.
///
/// Sends `[0xF0, 0x55]` and then `[0xFB, 0x00]`. Stops at the first failed
/// write; nothing is retried.
pub fn handshake<T: Transport>(transport: &mut T) -> Result<(), TransportError> {
    transport.send(&HANDSHAKE_INIT)?;
    transport.send(&HANDSHAKE_UNENCRYPTED)?;
    Ok(())
}

/// Read one complete state frame.
///
/// Sequence:
/// 1. settle
/// 2. write the state register address (`0x00`)
/// 3. settle again, with a freshly drawn duration
/// 4. read 6 bytes
///
/// Both settles are required by the device. The result is either a full
/// frame or the first transport error; a partial frame is never returned.
pub fn read_frame<T, D, R>(
    transport: &mut T,
    settle: &mut SettleDelay<D, R>,
) -> Result<RawFrame, TransportError>
where
    T: Transport,
    D: DelayNs,
    R: RngCore,
{
    settle.settle();
    transport.send(&[REG_STATE])?;
    settle.settle();

    let mut data = [0u8; FRAME_LEN];
    transport.recv(&mut data)?;

    Ok(RawFrame::new(data))
}

/// [`read_frame`] followed by decoding.
pub fn read_registers<T, D, R>(
    transport: &mut T,
    settle: &mut SettleDelay<D, R>,
) -> Result<DeviceRegisters, TransportError>
where
    T: Transport,
    D: DelayNs,
    R: RngCore,
{
    read_frame(transport, settle).map(|frame| frame.decode())
}
