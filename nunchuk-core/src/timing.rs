//! Blocking settle delays with jitter.

use embedded_hal::delay::DelayNs;
use rand_core::RngCore;

use crate::registers::{SETTLE_MAX_US, SETTLE_MIN_US};

/// Inclusive range a settle delay is drawn from, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SettleWindow {
    min_us: u32,
    max_us: u32,
}

impl SettleWindow {
    /// 10 ms to 20 ms.
    pub const DEFAULT: Self = Self {
        min_us: SETTLE_MIN_US,
        max_us: SETTLE_MAX_US,
    };

    /// Create a window; bounds given in either order are normalized.
    #[must_use]
    pub const fn new(a_us: u32, b_us: u32) -> Self {
        if a_us <= b_us {
            Self { min_us: a_us, max_us: b_us }
        } else {
            Self { min_us: b_us, max_us: a_us }
        }
    }

    #[inline]
    #[must_use]
    pub const fn min_us(&self) -> u32 {
        self.min_us
    }

    #[inline]
    #[must_use]
    pub const fn max_us(&self) -> u32 {
        self.max_us
    }

    /// Number of distinct durations in the window.
    #[inline]
    const fn span(&self) -> u64 {
        (self.max_us - self.min_us) as u64 + 1
    }

    /// Largest exclusive bound below which random words map onto the window
    /// without favouring its low end.
    #[inline]
    const fn accept_below(&self) -> u64 {
        let words = u32::MAX as u64 + 1;
        words - words % self.span()
    }

    /// Map a random word onto the window.
    ///
    /// Plain modulo reduction: words at or above the unbiased zone land
    /// slightly more often on the low end. [`SettleDelay`] rejects those.
    #[inline]
    #[must_use]
    pub const fn pick(&self, random: u32) -> u32 {
        self.min_us + (random as u64 % self.span()) as u32
    }
}

impl Default for SettleWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Blocks the caller for a randomly chosen time within a [`SettleWindow`].
///
/// Every call draws a fresh duration, so two consecutive settles are
/// independent of each other.
pub struct SettleDelay<D, R> {
    delay: D,
    rng: R,
    window: SettleWindow,
}

impl<D: DelayNs, R: RngCore> SettleDelay<D, R> {
    #[must_use]
    pub fn new(delay: D, rng: R, window: SettleWindow) -> Self {
        Self { delay, rng, window }
    }

    #[inline]
    #[must_use]
    pub fn window(&self) -> SettleWindow {
        self.window
    }

    /// Block for one settle period. Returns the chosen duration.
    pub fn settle(&mut self) -> u32 {
        let us = self.draw();
        self.delay.delay_us(us);
        us
    }

    /// Uniform draw from the window, by rejection sampling.
    fn draw(&mut self) -> u32 {
        let bound = self.window.accept_below();
        loop {
            let random = self.rng.next_u32();
            if u64::from(random) < bound {
                return self.window.pick(random);
            }
        }
    }

    /// Give back the delay provider and random source.
    pub fn release(self) -> (D, R) {
        (self.delay, self.rng)
    }
}
