//! Time source and sleep primitive
//!
//! Playback timing is expressed against this trait so the interleaving
//! algorithm can be driven by a simulated clock in tests and by
//! `embassy-time` on the target.

use core::future::Future;

/// Monotonic clock with an async delay
pub trait Clock {
    /// Microseconds since an arbitrary fixed epoch (monotonic)
    fn now_us(&self) -> u64;

    /// Milliseconds since the same epoch
    fn now_ms(&self) -> u64 {
        self.now_us() / 1_000
    }

    /// Wait for at least `us` microseconds
    fn delay_us(&self, us: u64) -> impl Future<Output = ()>;

    /// Wait for at least `ms` milliseconds
    fn delay_ms(&self, ms: u64) -> impl Future<Output = ()> {
        self.delay_us(ms.saturating_mul(1_000))
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn delay_us(&self, us: u64) -> impl Future<Output = ()> {
        (**self).delay_us(us)
    }
}
