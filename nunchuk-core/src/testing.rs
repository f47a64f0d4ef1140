//! Shared mocks for unit tests.
//!
//! Every mock appends to one [`Journal`] so tests can assert on the exact
//! interleaving of bus operations, delays and host calls.

extern crate std;

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::ErrorKind;
use rand_core::RngCore;

use crate::error::{AllocationError, BusOp, RegistrationError, TransportError};
use crate::input::{Axis, EventSink, InputDescriptor, InputSubsystem, Key, PollScheduler};
use crate::registers::FRAME_LEN;
use crate::timing::{SettleDelay, SettleWindow};
use crate::transport::Transport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Send(Vec<u8>),
    Recv(usize),
    /// Delay in microseconds.
    Delay(u32),
    TransportDropped,
    Allocate,
    Register(&'static str),
    Unregister,
    ReleaseDevice,
    Arm(u32),
    Disarm,
    Key(Key, bool),
    Abs(Axis, i32),
    Sync,
}

#[derive(Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Event>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(*e)).count()
    }

    pub fn contains(&self, event: &Event) -> bool {
        self.0.borrow().iter().any(|e| e == event)
    }

    pub fn sends(&self) -> usize {
        self.count(|e| matches!(e, Event::Send(_)))
    }

    pub fn delays(&self) -> usize {
        self.count(|e| matches!(e, Event::Delay(_)))
    }

    /// Events published to an input device (keys, axes, sync).
    pub fn published(&self) -> Vec<Event> {
        self.0
            .borrow()
            .iter()
            .filter(|e| matches!(e, Event::Key(..) | Event::Abs(..) | Event::Sync))
            .cloned()
            .collect()
    }
}

/// Transport that serves queued frames and fails on chosen calls.
pub struct MockTransport {
    journal: Journal,
    frames: VecDeque<[u8; FRAME_LEN]>,
    send_failures: Vec<(usize, ErrorKind)>,
    recv_failures: Vec<(usize, ErrorKind)>,
    sends: usize,
    recvs: usize,
}

impl MockTransport {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            frames: VecDeque::new(),
            send_failures: Vec::new(),
            recv_failures: Vec::new(),
            sends: 0,
            recvs: 0,
        }
    }

    pub fn push_frame(&mut self, frame: [u8; FRAME_LEN]) {
        self.frames.push_back(frame);
    }

    /// Fail the `nth` send (0-based, counted over the transport's lifetime).
    pub fn fail_send(&mut self, nth: usize, kind: ErrorKind) {
        self.send_failures.push((nth, kind));
    }

    /// Fail the `nth` receive (0-based, counted over the transport's lifetime).
    pub fn fail_recv(&mut self, nth: usize, kind: ErrorKind) {
        self.recv_failures.push((nth, kind));
    }

    fn failure(list: &[(usize, ErrorKind)], n: usize) -> Option<ErrorKind> {
        list.iter().find(|(i, _)| *i == n).map(|(_, kind)| *kind)
    }
}

impl Transport for MockTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        let n = self.sends;
        self.sends += 1;
        self.journal.push(Event::Send(bytes.to_vec()));
        match Self::failure(&self.send_failures, n) {
            Some(kind) => Err(TransportError::new(BusOp::Send, kind)),
            None => Ok(()),
        }
    }

    fn recv(&mut self, buffer: &mut [u8]) -> Result<(), TransportError> {
        let n = self.recvs;
        self.recvs += 1;
        self.journal.push(Event::Recv(buffer.len()));
        if let Some(kind) = Self::failure(&self.recv_failures, n) {
            return Err(TransportError::new(BusOp::Recv, kind));
        }
        let frame = self.frames.pop_front().unwrap_or([0; FRAME_LEN]);
        buffer.copy_from_slice(&frame[..buffer.len()]);
        Ok(())
    }
}

impl Drop for MockTransport {
    fn drop(&mut self) {
        self.journal.push(Event::TransportDropped);
    }
}

/// Delay that returns immediately and records the requested time.
pub struct MockDelay {
    journal: Journal,
}

impl MockDelay {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.journal.push(Event::Delay(ns / 1_000));
    }
}

/// Random source cycling through a fixed list of words.
pub struct SeqRng {
    values: Vec<u32>,
    index: usize,
}

impl SeqRng {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }
}

impl RngCore for SeqRng {
    fn next_u32(&mut self) -> u32 {
        let v = self.values[self.index % self.values.len()];
        self.index += 1;
        v
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u32() as u64
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        rand_core::impls::fill_bytes_via_next(self, dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Settle delay over the default window, recording into `journal`.
pub fn settle(journal: &Journal, random: Vec<u32>) -> SettleDelay<MockDelay, SeqRng> {
    SettleDelay::new(MockDelay::new(journal), SeqRng::new(random), SettleWindow::DEFAULT)
}

pub struct MockSink {
    journal: Journal,
}

impl EventSink for MockSink {
    fn report_key(&mut self, key: Key, pressed: bool) {
        self.journal.push(Event::Key(key, pressed));
    }

    fn report_abs(&mut self, axis: Axis, value: i32) {
        self.journal.push(Event::Abs(axis, value));
    }

    fn sync(&mut self) {
        self.journal.push(Event::Sync);
    }
}

pub struct MockHost {
    journal: Journal,
    pub fail_allocate: bool,
    pub fail_register: Option<RegistrationError>,
}

impl MockHost {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            fail_allocate: false,
            fail_register: None,
        }
    }
}

impl InputSubsystem for MockHost {
    type Device = MockSink;

    fn allocate(&mut self) -> Result<MockSink, AllocationError> {
        self.journal.push(Event::Allocate);
        if self.fail_allocate {
            return Err(AllocationError);
        }
        Ok(MockSink {
            journal: self.journal.clone(),
        })
    }

    fn register(
        &mut self,
        _device: &mut MockSink,
        descriptor: &InputDescriptor,
    ) -> Result<(), RegistrationError> {
        match self.fail_register {
            Some(err) => Err(err),
            None => {
                self.journal.push(Event::Register(descriptor.name));
                Ok(())
            }
        }
    }

    fn unregister(&mut self, _device: MockSink) {
        self.journal.push(Event::Unregister);
    }

    fn release(&mut self, _device: MockSink) {
        self.journal.push(Event::ReleaseDevice);
    }
}

pub struct MockScheduler {
    journal: Journal,
}

impl MockScheduler {
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
        }
    }
}

impl PollScheduler for MockScheduler {
    fn arm(&mut self, interval_ms: u32) {
        self.journal.push(Event::Arm(interval_ms));
    }

    fn disarm(&mut self) {
        self.journal.push(Event::Disarm);
    }
}
