// The strategy set follows relax.rs from spin-rs, with backoff counting
// based on crossbeam-utils' Backoff.
//
// spin-rs:
// https://github.com/mvdnes/spin-rs/blob/master/src/relax.rs
// Copyright (c) 2014 Mathijs van de Nes
//
// crossbeam-utils:
// https://github.com/crossbeam-rs/crossbeam/blob/master/crossbeam-utils/src/backoff.rs
// Copyright (c) 2019 The Crossbeam Project Developers
//
// Both licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your option.

//! Strategies that determine the behaviour of locks when encountering contention.

/// A trait implemented by spinning relax strategies.
///
/// A new instance is created for each lock acquisition attempt and dropped
/// once the lock is taken, so stateful strategies (such as backoff counters)
/// start fresh on every wait session.
pub trait Relax {
    /// Initialize the state for the relaxing operation, if any.
    fn new() -> Self;

    /// Perform the relaxing operation during a period of contention.
    fn relax(&mut self);
}

/// Rapidly spins while signaling the processor that it is running a busy-wait
/// spin-loop via [`core::hint::spin_loop`].
///
/// Note that spinning is a 'dumb' strategy and most schedulers cannot
/// correctly differentiate it from useful work, thereby misallocating even
/// more CPU time to the spinning process. This is known as [priority
/// inversion]. If priority inversion is a concern, consider [`Yield`] or a
/// scheduler-aware lock altogether.
///
/// [priority inversion]: https://matklad.github.io/2020/01/02/spinlocks-considered-harmful.html
pub struct Spin;

impl Relax for Spin {
    #[inline(always)]
    fn new() -> Self {
        Self
    }

    #[inline(always)]
    fn relax(&mut self) {
        core::hint::spin_loop();
    }
}

/// Yields the current time slice back to the OS scheduler in favour of other
/// threads or processes.
///
/// Requires a standard library, and targets that have one also have
/// scheduler-integrated locks available. Prefer those outside of testing and
/// measurement scenarios.
#[cfg(any(feature = "yield", loom, test))]
#[cfg_attr(docsrs, doc(cfg(feature = "yield")))]
pub struct Yield;

#[cfg(any(feature = "yield", all(test, not(loom))))]
impl Relax for Yield {
    #[inline(always)]
    fn new() -> Self {
        Self
    }

    #[inline]
    fn relax(&mut self) {
        std::thread::yield_now();
    }
}

/// When running Loom models, we must call Loom's `yield_now` to tell Loom
/// that another thread needs to be scheduled in order for the current one to
/// make progress.
#[cfg(all(loom, test))]
impl Relax for Yield {
    #[inline(always)]
    fn new() -> Self {
        Self
    }

    #[inline(always)]
    fn relax(&mut self) {
        loom::thread::yield_now();
    }
}

/// Rapidly spins without telling the CPU to do any powering down.
///
/// You almost certainly do not want this. Use [`Spin`] instead. It exists for
/// completeness and for targets that miscompile or lack the spin hint
/// intrinsic.
pub struct Loop;

impl Relax for Loop {
    #[inline(always)]
    fn new() -> Self {
        Self
    }

    #[inline(always)]
    fn relax(&mut self) {}
}

/// As [`Spin`], runs a busy-wait spin-loop, but with exponential backoff.
///
/// Backing off can reduce cache-line traffic under heavy contention, since
/// waiters re-read the lock word less often. Profile before assuming an
/// improvement. Subject to the same priority inversion hazards as [`Spin`].
pub struct SpinBackoff {
    step: Step,
}

impl SpinBackoff {
    const SPIN_LIMIT: u32 = 6;
}

impl Relax for SpinBackoff {
    #[inline(always)]
    fn new() -> Self {
        Self { step: Step(0) }
    }

    #[inline(always)]
    fn relax(&mut self) {
        self.step.spin_to(Self::SPIN_LIMIT);
        self.step.step_to(Self::SPIN_LIMIT);
    }
}

/// As [`Yield`], yields back to the OS scheduler, but only after spinning
/// with exponential backoff up to a threshold.
#[cfg(feature = "yield")]
#[cfg_attr(docsrs, doc(cfg(feature = "yield")))]
pub struct YieldBackoff {
    step: Step,
}

#[cfg(feature = "yield")]
impl YieldBackoff {
    const SPIN_LIMIT: u32 = SpinBackoff::SPIN_LIMIT;
    const YIELD_LIMIT: u32 = 10;
}

#[cfg(feature = "yield")]
impl Relax for YieldBackoff {
    #[inline(always)]
    fn new() -> Self {
        Self { step: Step(0) }
    }

    #[inline(always)]
    fn relax(&mut self) {
        if self.step.0 <= Self::SPIN_LIMIT {
            self.step.spin();
        } else {
            std::thread::yield_now();
        }
        self.step.step_to(Self::YIELD_LIMIT);
    }
}

/// Keeps count of the number of steps taken.
struct Step(u32);

impl Step {
    /// Unbounded backoff spinning.
    #[cfg(feature = "yield")]
    fn spin(&self) {
        for _ in 0..1 << self.0 {
            core::hint::spin_loop();
        }
    }

    /// Bounded backoff spinning.
    fn spin_to(&self, max: u32) {
        for _ in 0..1 << self.0.min(max) {
            core::hint::spin_loop();
        }
    }

    /// Bounded step increment.
    fn step_to(&mut self, end: u32) {
        if self.0 <= end {
            self.0 += 1;
        }
    }
}
