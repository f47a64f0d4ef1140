//! Device handle and the attach/poll/detach lifecycle.

use core::fmt;

use embedded_hal::delay::DelayNs;
use rand_core::RngCore;

use crate::config::NunchukConfig;
use crate::error::{AttachError, DriverError, TransportError};
use crate::frame::DeviceRegisters;
use crate::input::{Axis, EventSink, InputDescriptor, InputSubsystem, Key, PollScheduler};
use crate::protocol;
use crate::timing::SettleDelay;
use crate::transport::Transport;

/// Lifecycle of one attached controller.
///
/// ```text
/// Uninitialized -> Handshaking -> Verifying -> Registered -> Removed
///                        \             \
///                         +-------------+--> Failed
/// ```
///
/// `Removed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LifecycleState {
    Uninitialized,
    Handshaking,
    Verifying,
    Registered,
    Removed,
    Failed,
}

impl LifecycleState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, LifecycleState::Removed | LifecycleState::Failed)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Handshaking => "handshaking",
            LifecycleState::Verifying => "verifying",
            LifecycleState::Registered => "registered",
            LifecycleState::Removed => "removed",
            LifecycleState::Failed => "failed",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Exclusive owner of the transport and its timing.
///
/// Holds no device state: every read produces a fresh frame.
pub struct DeviceHandle<T, D, R> {
    transport: T,
    settle: SettleDelay<D, R>,
}

impl<T, D, R> DeviceHandle<T, D, R>
where
    T: Transport,
    D: DelayNs,
    R: RngCore,
{
    pub fn new(transport: T, settle: SettleDelay<D, R>) -> Self {
        Self { transport, settle }
    }

    /// See [`protocol::handshake`].
    pub fn handshake(&mut self) -> Result<(), TransportError> {
        protocol::handshake(&mut self.transport)
    }

    /// See [`protocol::read_registers`].
    pub fn read_registers(&mut self) -> Result<DeviceRegisters, TransportError> {
        protocol::read_registers(&mut self.transport, &mut self.settle)
    }
}

/// Publish one decoded frame as a complete event batch.
///
/// Order: Z key, C key, X axis, Y axis, sync.
pub fn publish<S: EventSink + ?Sized>(sink: &mut S, regs: &DeviceRegisters) {
    sink.report_key(Key::Z, regs.z_pressed);
    sink.report_key(Key::C, regs.c_pressed);

    sink.report_abs(Axis::X, i32::from(regs.x));
    sink.report_abs(Axis::Y, i32::from(regs.y));

    sink.sync();
}

/// Nunchuk driver instance.
///
/// Created in `Uninitialized`. [`attach`](Self::attach) brings it to
/// `Registered`, after which the host calls [`poll`](Self::poll) once per
/// tick until [`detach`](Self::detach).
///
/// `poll` takes `&mut self`, so at most one poll per instance can be in
/// flight; no locking is done here.
pub struct Nunchuk<T, D, R, E> {
    config: NunchukConfig,
    state: LifecycleState,
    handle: Option<DeviceHandle<T, D, R>>,
    input: Option<E>,
}

impl<T, D, R, E> Nunchuk<T, D, R, E>
where
    T: Transport,
    D: DelayNs,
    R: RngCore,
    E: EventSink,
{
    #[must_use]
    pub fn new(config: NunchukConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            handle: None,
            input: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &NunchukConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.state == LifecycleState::Registered
    }

    /// Bring the controller up and expose it as an input device.
    ///
    /// Handshakes, reads the state twice (a warm-up read, then the baseline
    /// that is logged), allocates and registers an input device with `host`,
    /// and arms `scheduler`.
    ///
    /// All or nothing: on any failure the instance ends in `Failed`, the
    /// transport is dropped, an allocated input device is handed back to
    /// `host`, and the first error is returned together with the stage it
    /// occurred in.
    pub fn attach<H, S>(
        &mut self,
        transport: T,
        delay: D,
        rng: R,
        host: &mut H,
        scheduler: &mut S,
    ) -> Result<(), AttachError>
    where
        H: InputSubsystem<Device = E>,
        S: PollScheduler,
    {
        if self.state != LifecycleState::Uninitialized {
            return Err(AttachError {
                stage: self.state,
                error: DriverError::InvalidState(self.state),
            });
        }

        self.transition(LifecycleState::Handshaking);
        let mut handle = DeviceHandle::new(transport, SettleDelay::new(delay, rng, self.config.settle));

        if let Err(e) = handle.handshake() {
            error!("Nunchuk handshake failed: {}", e);
            return Err(self.fail(e.into()));
        }

        self.transition(LifecycleState::Verifying);
        match handle.read_registers() {
            Ok(regs) => debug!("Nunchuk warm-up read: {}", regs),
            Err(e) => {
                error!("Failed to read the Nunchuk state: {}", e);
                return Err(self.fail(e.into()));
            }
        }
        let baseline = match handle.read_registers() {
            Ok(regs) => regs,
            Err(e) => {
                error!("Failed to read the Nunchuk state: {}", e);
                return Err(self.fail(e.into()));
            }
        };
        info!("Nunchuk baseline: {}", baseline);

        let mut device = match host.allocate() {
            Ok(device) => device,
            Err(e) => {
                error!("Failed to allocate input device: {}", e);
                return Err(self.fail(e.into()));
            }
        };

        let descriptor = InputDescriptor::NUNCHUK.with_poll_interval(self.config.poll_interval_ms);
        if let Err(e) = host.register(&mut device, &descriptor) {
            error!("Failed to register input device: {}", e);
            host.release(device);
            return Err(self.fail(e.into()));
        }

        scheduler.arm(self.config.poll_interval_ms);

        self.handle = Some(handle);
        self.input = Some(device);
        self.transition(LifecycleState::Registered);
        info!(
            "Nunchuk registered, polling every {} ms",
            self.config.poll_interval_ms
        );

        Ok(())
    }

    /// One poll tick: read a frame and publish it.
    ///
    /// A failed read is logged and nothing is published for this tick. The
    /// instance stays `Registered`; the error is returned only so the host
    /// can count it.
    pub fn poll(&mut self) -> Result<(), DriverError> {
        let (Some(handle), Some(input)) = (self.handle.as_mut(), self.input.as_mut()) else {
            return Err(DriverError::InvalidState(self.state));
        };

        match handle.read_registers() {
            Ok(regs) => {
                trace!("Nunchuk state: {}", regs);
                publish(input, &regs);
                Ok(())
            }
            Err(e) => {
                error!("Failed to read the Nunchuk state: {}", e);
                Err(e.into())
            }
        }
    }

    /// Stop polling, remove the input device and release the transport.
    pub fn detach<H, S>(&mut self, host: &mut H, scheduler: &mut S) -> Result<(), DriverError>
    where
        H: InputSubsystem<Device = E>,
        S: PollScheduler,
    {
        if self.state != LifecycleState::Registered {
            return Err(DriverError::InvalidState(self.state));
        }

        scheduler.disarm();
        info!("Nunchuk removed");

        if let Some(device) = self.input.take() {
            host.unregister(device);
        }
        self.handle = None;
        self.transition(LifecycleState::Removed);

        Ok(())
    }

    fn transition(&mut self, next: LifecycleState) {
        trace!("Nunchuk {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, error: DriverError) -> AttachError {
        let stage = self.state;
        self.transition(LifecycleState::Failed);
        AttachError { stage, error }
    }
}

impl<T, D, R, E> Default for Nunchuk<T, D, R, E>
where
    T: Transport,
    D: DelayNs,
    R: RngCore,
    E: EventSink,
{
    fn default() -> Self {
        Self::new(NunchukConfig::default())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::error::{AllocationError, BusOp, RegistrationError};
    use crate::testing::{
        Event, Journal, MockDelay, MockHost, MockScheduler, MockSink, MockTransport, SeqRng,
    };
    use crate::timing::SettleWindow;
    use embedded_hal::i2c::ErrorKind;
    use std::vec;
    use std::vec::Vec;

    type TestNunchuk = Nunchuk<MockTransport, MockDelay, SeqRng, MockSink>;

    struct Rig {
        journal: Journal,
        host: MockHost,
        scheduler: MockScheduler,
        nunchuk: TestNunchuk,
    }

    impl Rig {
        fn new() -> Self {
            let journal = Journal::new();
            Self {
                host: MockHost::new(&journal),
                scheduler: MockScheduler::new(&journal),
                nunchuk: Nunchuk::default(),
                journal,
            }
        }

        fn transport(&self) -> MockTransport {
            MockTransport::new(&self.journal)
        }

        fn attach(&mut self, transport: MockTransport) -> Result<(), AttachError> {
            let delay = MockDelay::new(&self.journal);
            let rng = SeqRng::new(vec![0]);
            self.nunchuk
                .attach(transport, delay, rng, &mut self.host, &mut self.scheduler)
        }
    }

    fn batch(frame_z: bool, frame_c: bool, x: i32, y: i32) -> Vec<Event> {
        vec![
            Event::Key(Key::Z, frame_z),
            Event::Key(Key::C, frame_c),
            Event::Abs(Axis::X, x),
            Event::Abs(Axis::Y, y),
            Event::Sync,
        ]
    }

    #[test]
    fn test_attach_sequence() {
        let mut rig = Rig::new();
        let transport = rig.transport();

        rig.attach(transport).unwrap();

        assert_eq!(rig.nunchuk.state(), LifecycleState::Registered);
        let read = [
            Event::Delay(10_000),
            Event::Send(vec![0x00]),
            Event::Delay(10_000),
            Event::Recv(6),
        ];
        let mut expected = vec![Event::Send(vec![0xF0, 0x55]), Event::Send(vec![0xFB, 0x00])];
        expected.extend_from_slice(&read);
        expected.extend_from_slice(&read);
        expected.extend_from_slice(&[
            Event::Allocate,
            Event::Register("Nintendo Wiichuk"),
            Event::Arm(5),
        ]);
        assert_eq!(rig.journal.events(), expected);
        // Verification reads publish nothing
        assert!(rig.journal.published().is_empty());
    }

    #[test]
    fn test_attach_aborts_when_second_handshake_write_fails() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        transport.fail_send(1, ErrorKind::Bus);

        let err = rig.attach(transport).unwrap_err();

        assert_eq!(err.stage, LifecycleState::Handshaking);
        assert!(matches!(
            err.error,
            DriverError::Transport(TransportError { op: BusOp::Send, .. })
        ));
        assert_eq!(rig.nunchuk.state(), LifecycleState::Failed);
        assert!(!rig.journal.contains(&Event::Allocate));
        assert!(!rig.journal.contains(&Event::Register("Nintendo Wiichuk")));
        assert!(!rig.journal.contains(&Event::Arm(5)));
        // Handle released exactly once
        assert_eq!(rig.journal.count(|e| *e == Event::TransportDropped), 1);
    }

    #[test]
    fn test_attach_aborts_on_warm_up_read_failure() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        transport.fail_recv(0, ErrorKind::Other);

        let err = rig.attach(transport).unwrap_err();

        assert_eq!(err.stage, LifecycleState::Verifying);
        assert_eq!(rig.nunchuk.state(), LifecycleState::Failed);
        assert!(!rig.journal.contains(&Event::Allocate));
        assert!(rig.journal.contains(&Event::TransportDropped));
    }

    #[test]
    fn test_attach_aborts_on_baseline_read_failure() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        transport.fail_send(3, ErrorKind::Bus);

        let err = rig.attach(transport).unwrap_err();

        assert_eq!(err.stage, LifecycleState::Verifying);
        assert!(matches!(err.error, DriverError::Transport(_)));
        assert!(!rig.journal.contains(&Event::Allocate));
        assert!(rig.journal.contains(&Event::TransportDropped));
    }

    #[test]
    fn test_attach_aborts_on_allocation_failure() {
        let mut rig = Rig::new();
        rig.host.fail_allocate = true;
        let transport = rig.transport();

        let err = rig.attach(transport).unwrap_err();

        assert_eq!(err.error, DriverError::Allocation(AllocationError));
        assert_eq!(rig.nunchuk.state(), LifecycleState::Failed);
        assert!(!rig.journal.contains(&Event::Arm(5)));
        assert!(rig.journal.contains(&Event::TransportDropped));
    }

    #[test]
    fn test_attach_releases_device_on_registration_failure() {
        let mut rig = Rig::new();
        rig.host.fail_register = Some(RegistrationError::Rejected);
        let transport = rig.transport();

        let err = rig.attach(transport).unwrap_err();

        assert_eq!(
            err.error,
            DriverError::Registration(RegistrationError::Rejected)
        );
        assert_eq!(rig.nunchuk.state(), LifecycleState::Failed);
        let events = rig.journal.events();
        let tail = &events[events.len() - 3..];
        assert_eq!(
            tail,
            &[Event::Allocate, Event::ReleaseDevice, Event::TransportDropped]
        );
        assert!(!rig.journal.contains(&Event::Arm(5)));
    }

    #[test]
    fn test_failed_is_absorbing() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        transport.fail_send(0, ErrorKind::Bus);
        rig.attach(transport).unwrap_err();

        let transport = rig.transport();
        let err = rig.attach(transport).unwrap_err();
        assert_eq!(err.error, DriverError::InvalidState(LifecycleState::Failed));
        assert_eq!(rig.nunchuk.state(), LifecycleState::Failed);
        assert_eq!(
            rig.nunchuk.poll(),
            Err(DriverError::InvalidState(LifecycleState::Failed))
        );
    }

    #[test]
    fn test_poll_publishes_batch_in_order() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        transport.push_frame([0; 6]);
        transport.push_frame([0; 6]);
        transport.push_frame([0x10, 0x20, 0x01, 0x02, 0x03, 0x02]);
        rig.attach(transport).unwrap();
        rig.journal.clear();

        rig.nunchuk.poll().unwrap();

        // Byte 5 = 0x02: Z pressed (bit 0 clear), C released (bit 1 set)
        assert_eq!(rig.journal.published(), batch(true, false, 16, 32));
        assert_eq!(rig.journal.events().last(), Some(&Event::Sync));
    }

    #[test]
    fn test_poll_failure_skips_tick_and_keeps_registration() {
        let mut rig = Rig::new();
        let mut transport = rig.transport();
        // recv 0 and 1 are the verification reads
        transport.push_frame([0; 6]);
        transport.push_frame([0; 6]);
        transport.push_frame([1, 2, 0, 0, 0, 0x03]);
        transport.push_frame([5, 6, 0, 0, 0, 0x00]);
        transport.fail_recv(3, ErrorKind::Bus);
        rig.attach(transport).unwrap();
        rig.journal.clear();

        assert!(rig.nunchuk.poll().is_ok());
        assert_eq!(rig.nunchuk.state(), LifecycleState::Registered);
        assert_eq!(rig.journal.published(), batch(false, false, 1, 2));
        rig.journal.clear();

        let err = rig.nunchuk.poll().unwrap_err();
        assert!(matches!(
            err,
            DriverError::Transport(TransportError { op: BusOp::Recv, .. })
        ));
        assert_eq!(rig.nunchuk.state(), LifecycleState::Registered);
        assert!(rig.journal.published().is_empty());
        assert!(!rig.journal.contains(&Event::Disarm));
        rig.journal.clear();

        assert!(rig.nunchuk.poll().is_ok());
        assert_eq!(rig.nunchuk.state(), LifecycleState::Registered);
        assert_eq!(rig.journal.published(), batch(true, true, 5, 6));
    }

    #[test]
    fn test_poll_before_attach_is_rejected() {
        let mut rig = Rig::new();
        assert_eq!(
            rig.nunchuk.poll(),
            Err(DriverError::InvalidState(LifecycleState::Uninitialized))
        );
        assert!(rig.journal.events().is_empty());
    }

    #[test]
    fn test_detach_disarms_then_releases() {
        let mut rig = Rig::new();
        let transport = rig.transport();
        rig.attach(transport).unwrap();
        rig.journal.clear();

        rig.nunchuk
            .detach(&mut rig.host, &mut rig.scheduler)
            .unwrap();

        assert_eq!(rig.nunchuk.state(), LifecycleState::Removed);
        assert_eq!(
            rig.journal.events(),
            vec![Event::Disarm, Event::Unregister, Event::TransportDropped]
        );

        // Nothing reaches the bus after detach
        rig.journal.clear();
        assert_eq!(
            rig.nunchuk.poll(),
            Err(DriverError::InvalidState(LifecycleState::Removed))
        );
        assert_eq!(
            rig.nunchuk.detach(&mut rig.host, &mut rig.scheduler),
            Err(DriverError::InvalidState(LifecycleState::Removed))
        );
        assert!(rig.journal.events().is_empty());
    }

    #[test]
    fn test_attach_uses_configured_poll_interval() {
        let journal = Journal::new();
        let mut host = MockHost::new(&journal);
        let mut scheduler = MockScheduler::new(&journal);
        let mut nunchuk: TestNunchuk = Nunchuk::new(NunchukConfig::default().with_poll_interval(20));

        nunchuk
            .attach(
                MockTransport::new(&journal),
                MockDelay::new(&journal),
                SeqRng::new(vec![0]),
                &mut host,
                &mut scheduler,
            )
            .unwrap();

        assert!(journal.contains(&Event::Arm(20)));
        assert_eq!(nunchuk.config().poll_interval_ms, 20);
    }

    #[test]
    fn test_attach_with_reversed_settle_bounds() {
        let journal = Journal::new();
        let mut host = MockHost::new(&journal);
        let mut scheduler = MockScheduler::new(&journal);
        let config = NunchukConfig::default().with_settle(SettleWindow::new(20_000, 10_000));
        let mut nunchuk: TestNunchuk = Nunchuk::new(config);

        nunchuk
            .attach(
                MockTransport::new(&journal),
                MockDelay::new(&journal),
                SeqRng::new(vec![5, 10_000]),
                &mut host,
                &mut scheduler,
            )
            .unwrap();

        assert_eq!(nunchuk.state(), LifecycleState::Registered);
        let delays: Vec<Event> = journal
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Delay(_)))
            .collect();
        assert_eq!(
            delays,
            vec![
                Event::Delay(10_005),
                Event::Delay(20_000),
                Event::Delay(10_005),
                Event::Delay(20_000),
            ]
        );
    }

    #[test]
    fn test_terminal_states() {
        assert!(LifecycleState::Removed.is_terminal());
        assert!(LifecycleState::Failed.is_terminal());
        assert!(!LifecycleState::Registered.is_terminal());
        assert_eq!(std::format!("{}", LifecycleState::Verifying), "verifying");
    }
}
