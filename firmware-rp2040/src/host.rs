//! Embassy implementations of the driver's host traits.
//!
//! [`SignalInput`] hands out a single [`SignalSink`] that folds key and axis
//! events into a [`NunchukReport`] and publishes it on `sync`. The output
//! task picks it up from the shared [`ReportSignal`].

use defmt::info;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Ticker};
use nunchuk_core::{
    AllocationError, Axis, EventSink, InputDescriptor, InputSubsystem, Key,
    PollScheduler, RegistrationError,
};

use crate::usb_output::NunchukReport;

/// Latest-value channel between the poll task and the USB output task.
pub type ReportSignal = Signal<CriticalSectionRawMutex, NunchukReport>;

/// Input device backed by a [`ReportSignal`].
pub struct SignalSink {
    signal: &'static ReportSignal,
    pending: NunchukReport,
}

impl SignalSink {
    fn new(signal: &'static ReportSignal) -> Self {
        Self {
            signal,
            pending: NunchukReport::neutral(),
        }
    }
}

impl EventSink for SignalSink {
    fn report_key(&mut self, key: Key, pressed: bool) {
        let bit = match key {
            Key::Z => NunchukReport::BUTTON_Z,
            Key::C => NunchukReport::BUTTON_C,
        };
        if pressed {
            self.pending.buttons |= bit;
        } else {
            self.pending.buttons &= !bit;
        }
    }

    fn report_abs(&mut self, axis: Axis, value: i32) {
        let value = value.clamp(0, u8::MAX as i32) as u8;
        match axis {
            Axis::X => self.pending.x = value,
            Axis::Y => self.pending.y = value,
        }
    }

    fn sync(&mut self) {
        // Overwrites any report the output task has not consumed yet
        self.signal.signal(self.pending);
    }
}

/// The board's input subsystem: one USB joystick, one device slot.
pub struct SignalInput {
    signal: Option<&'static ReportSignal>,
    registered: bool,
}

impl SignalInput {
    #[must_use]
    pub const fn new(signal: &'static ReportSignal) -> Self {
        Self {
            signal: Some(signal),
            registered: false,
        }
    }
}

impl InputSubsystem for SignalInput {
    type Device = SignalSink;

    fn allocate(&mut self) -> Result<SignalSink, AllocationError> {
        self.signal.take().map(SignalSink::new).ok_or(AllocationError)
    }

    fn register(
        &mut self,
        _device: &mut SignalSink,
        descriptor: &InputDescriptor,
    ) -> Result<(), RegistrationError> {
        if self.registered {
            return Err(RegistrationError::AlreadyRegistered);
        }
        self.registered = true;
        info!(
            "Input device registered: {} on {} ({} keys, {} axes)",
            descriptor.name,
            descriptor.bus,
            descriptor.keys.len(),
            descriptor.axes.len()
        );
        Ok(())
    }

    fn unregister(&mut self, device: SignalSink) {
        self.registered = false;
        // Do not leave the last stick position latched on the host
        device.signal.signal(NunchukReport::neutral());
        self.signal = Some(device.signal);
    }

    fn release(&mut self, device: SignalSink) {
        self.signal = Some(device.signal);
    }
}

/// Periodic poll timer on top of an embassy [`Ticker`].
///
/// A tick that finishes late is followed immediately by the next one;
/// the ticker never runs two polls concurrently.
#[derive(Default)]
pub struct TickScheduler {
    ticker: Option<Ticker>,
}

impl TickScheduler {
    #[must_use]
    pub const fn new() -> Self {
        Self { ticker: None }
    }

    /// Wait for the next tick. Never completes while disarmed.
    pub async fn next(&mut self) {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.next().await,
            None => core::future::pending().await,
        }
    }
}

impl PollScheduler for TickScheduler {
    fn arm(&mut self, interval_ms: u32) {
        self.ticker = Some(Ticker::every(Duration::from_millis(u64::from(interval_ms))));
    }

    fn disarm(&mut self) {
        self.ticker = None;
    }
}
