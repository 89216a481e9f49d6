//! A simple and correct implementation of a `test-and-test-and-set` (TTAS)
//! [spin-lock] for mutual exclusion, with a contention stress harness to
//! exercise it.
//!
//! A TTAS lock acquires by swapping a single boolean lock word and, while the
//! word reads held, waits by re-reading it instead of re-swapping. The main
//! properties of this mechanism are:
//!
//! - waiters spin on read-only loads, so the holder keeps the lock word's
//!   cache line until it releases;
//! - requires a single boolean of space per lock;
//! - acquisition order is unspecified: the lock is unfair and a releasing
//!   thread may immediately reacquire ahead of older waiters.
//!
//! ## Use cases
//!
//! [Spinlocks are usually not what you want]. The majority of use cases are
//! well covered by OS-based mutexes like [`std::sync::Mutex`] or
//! [`parking_lot::Mutex`]. These implementations will notify the system that
//! the waiting thread should be parked, freeing the processor to work on
//! something else.
//!
//! Spinlocks are only efficient in very few circumstances where the overhead
//! of context switching or process rescheduling are greater than busy waiting
//! for very short periods. Spinlocks can be useful inside operating-system
//! kernels, on embedded systems or even complement other locking designs.
//! This implementation is `no_std` by default, so it's useful in those
//! environments.
//!
//! ## Stress harness
//!
//! The [`harness`] module (and the `ttas-stress` binary built from it) runs a
//! configurable number of worker threads that repeatedly add their own id to
//! one shared counter under the lock, then checks the final counter against
//! the closed-form sum. Any mutual exclusion violation shows up as a lost
//! update:
//!
//! ```
//! use ttaslock::harness::{run, Config};
//! use ttaslock::relax::Spin;
//!
//! let report = run::<Spin>(&Config::new(4, 100)).unwrap();
//! assert!(report.passed());
//! ```
//!
//! ## Features
//!
//! This crate provides the `harness` feature by default. Features that can be
//! enabled are:
//!
//! ### yield
//!
//! The `yield` feature requires linking to the standard library, so it is not
//! suitable for `no_std` environments. By enabling the `yield` feature, you
//! get access to the [`relax::Yield`] and [`relax::YieldBackoff`] strategies,
//! which cooperatively give up a timeslice to the OS scheduler during
//! contention instead of busy-waiting.
//!
//! ### harness
//!
//! The `harness` feature (enabled by default) provides the [`harness`] stress
//! module and the `ttas-stress` binary. It requires the standard library and
//! implies `yield`.
//!
//! ### lock_api
//!
//! The `lock_api` feature implements the [`RawMutex`] trait of the [lock_api]
//! crate for [`Mutex<(), R>`], and exports compatible type aliases under the
//! `lock_api` module of this crate. This feature is `no_std` compatible.
//!
//! ## Related projects
//!
//! These projects provide spin-based locks with slightly different trade-offs,
//! you can check their repositories:
//!
//! - `spin-rs`: <https://github.com/mvdnes/spin-rs>
//! - `mcslock`: <https://github.com/pedromfedricci/mcslock>
//!
//! [`Mutex<(), R>`]: Mutex
//! [`std::sync::Mutex`]: https://doc.rust-lang.org/std/sync/struct.Mutex.html
//! [`parking_lot::Mutex`]: https://docs.rs/parking_lot/latest/parking_lot/type.Mutex.html
//! [spin-lock]: https://en.wikipedia.org/wiki/Spinlock
//! [lock_api]: https://docs.rs/lock_api/latest/lock_api
//! [`RawMutex`]: https://docs.rs/lock_api/latest/lock_api/trait.RawMutex.html
//! [Spinlocks are usually not what you want]: https://matklad.github.io/2020/01/02/spinlocks-considered-harmful.html

#![cfg_attr(all(not(feature = "yield"), not(test)), no_std)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

#[cfg(all(loom, test))]
pub(crate) mod loom;

pub mod relax;

mod mutex;
pub use mutex::{Mutex, MutexGuard};

#[cfg(feature = "lock_api")]
#[cfg_attr(docsrs, doc(cfg(feature = "lock_api")))]
pub mod lock_api;

#[cfg(all(feature = "harness", not(all(loom, test))))]
#[cfg_attr(docsrs, doc(cfg(feature = "harness")))]
pub mod harness;

/// A `test-and-test-and-set` lock alias that signals the processor that it is
/// running a busy-wait spin-loop during lock contention.
pub mod spins {
    use crate::relax::Spin;

    /// A `test-and-test-and-set` lock that implements the [`Spin`] relax
    /// strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use ttaslock::spins::Mutex;
    ///
    /// let mutex = Mutex::new(0);
    /// let data = mutex.lock_then(|guard| *guard);
    /// assert_eq!(data, 0);
    /// ```
    pub type Mutex<T> = crate::Mutex<T, Spin>;

    /// A `test-and-test-and-set` guard that implements the [`Spin`] relax
    /// strategy.
    pub type MutexGuard<'a, T> = crate::MutexGuard<'a, T, Spin>;

    /// A `test-and-test-and-set` lock alias that, during lock contention, will
    /// perform exponential backoff while signaling the processor that it is
    /// running a busy-wait spin-loop.
    pub mod backoff {
        use crate::relax::SpinBackoff;

        /// A `test-and-test-and-set` lock that implements the [`SpinBackoff`]
        /// relax strategy.
        ///
        /// # Example
        ///
        /// ```
        /// use ttaslock::spins::backoff::Mutex;
        ///
        /// let mutex = Mutex::new(0);
        /// let data = mutex.lock_then(|guard| *guard);
        /// assert_eq!(data, 0);
        /// ```
        pub type Mutex<T> = crate::Mutex<T, SpinBackoff>;

        /// A `test-and-test-and-set` guard that implements the [`SpinBackoff`]
        /// relax strategy.
        pub type MutexGuard<'a, T> = crate::MutexGuard<'a, T, SpinBackoff>;
    }
}

/// A `test-and-test-and-set` lock alias that yields the current time slice to
/// the OS scheduler during lock contention.
#[cfg(any(feature = "yield", loom, test))]
#[cfg_attr(docsrs, doc(cfg(feature = "yield")))]
pub mod yields {
    use crate::relax::Yield;

    /// A `test-and-test-and-set` lock that implements the [`Yield`] relax
    /// strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use ttaslock::yields::Mutex;
    ///
    /// let mutex = Mutex::new(0);
    /// let data = mutex.lock_then(|guard| *guard);
    /// assert_eq!(data, 0);
    /// ```
    pub type Mutex<T> = crate::Mutex<T, Yield>;

    /// A `test-and-test-and-set` guard that implements the [`Yield`] relax
    /// strategy.
    pub type MutexGuard<'a, T> = crate::MutexGuard<'a, T, Yield>;

    /// A `test-and-test-and-set` lock alias that, during lock contention, will
    /// perform exponential backoff while spinning up to a threshold, then
    /// yields back to the OS scheduler.
    #[cfg(feature = "yield")]
    #[cfg_attr(docsrs, doc(cfg(feature = "yield")))]
    pub mod backoff {
        use crate::relax::YieldBackoff;

        /// A `test-and-test-and-set` lock that implements the [`YieldBackoff`]
        /// relax strategy.
        ///
        /// # Example
        ///
        /// ```
        /// use ttaslock::yields::backoff::Mutex;
        ///
        /// let mutex = Mutex::new(0);
        /// let data = mutex.lock_then(|guard| *guard);
        /// assert_eq!(data, 0);
        /// ```
        pub type Mutex<T> = crate::Mutex<T, YieldBackoff>;

        /// A `test-and-test-and-set` guard that implements the
        /// [`YieldBackoff`] relax strategy.
        pub type MutexGuard<'a, T> = crate::MutexGuard<'a, T, YieldBackoff>;
    }
}

/// A `test-and-test-and-set` lock alias that rapidly spins without telling the
/// CPU to do any power down during lock contention.
pub mod loops {
    use crate::relax::Loop;

    /// A `test-and-test-and-set` lock that implements the [`Loop`] relax
    /// strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use ttaslock::loops::Mutex;
    ///
    /// let mutex = Mutex::new(0);
    /// let data = mutex.lock_then(|guard| *guard);
    /// assert_eq!(data, 0);
    /// ```
    pub type Mutex<T> = crate::Mutex<T, Loop>;

    /// A `test-and-test-and-set` guard that implements the [`Loop`] relax
    /// strategy.
    pub type MutexGuard<'a, T> = crate::MutexGuard<'a, T, Loop>;
}
