//! A contention stress harness that validates mutual exclusion under load.
//!
//! The harness shares one counter, protected by a [`Mutex`], across a
//! configurable number of worker threads. Every worker adds its own id to the
//! counter once per iteration, while holding the lock for a pseudo-random
//! amount of extra work so that hold times vary between acquisitions. Since
//! each increment is a non-atomic read-modify-write, any mutual exclusion
//! violation shows up as a lost update: the final counter value falls short of
//! the closed-form expectation.
//!
//! # Examples
//!
//! ```
//! use ttaslock::harness::{run, Config};
//! use ttaslock::relax::Spin;
//!
//! let config = Config::new(4, 100);
//! let report = run::<Spin>(&config).unwrap();
//! assert!(report.passed());
//! ```

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::relax::Relax;
use crate::Mutex;

/// Upper bound (exclusive) for the pseudo-random number of extra additions a
/// worker performs per iteration while holding the lock.
const EXTRA_BOUND: u64 = 128;

/// The workload shape of a stress run.
///
/// [`Default`] is the reference shape: 512 workers, 1024 iterations each, a
/// 5 ms staggered start and a zero offset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of worker threads to spawn.
    pub threads: usize,
    /// Number of counter increments each worker performs.
    pub iterations: u64,
    /// Value added by the extra, hold-time-varying additions.
    ///
    /// Kept at zero by default so that [`expected`] stays exact regardless of
    /// how many extra additions each iteration draws.
    ///
    /// [`expected`]: Config::expected
    pub offset: u64,
    /// How long each worker sleeps before entering its loop, so that workers
    /// reach the lock together and the contention window is as wide as
    /// possible.
    pub start_delay: Duration,
    /// Base seed for the per-worker random number generators. Worker `id`
    /// seeds its generator with `seed + id`, so runs are reproducible while
    /// workers stay decorrelated.
    pub seed: u64,
}

impl Config {
    /// Creates a config with the given shape and the reference values for the
    /// remaining fields.
    #[must_use]
    pub fn new(threads: usize, iterations: u64) -> Self {
        Self { threads, iterations, ..Self::default() }
    }

    /// The counter value a run must produce: the sum of `id * iterations`
    /// over all worker ids `0..threads`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ttaslock::harness::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.expected(), 133_955_584);
    /// ```
    #[must_use]
    pub fn expected(&self) -> u64 {
        (0..self.threads as u64).map(|id| id * self.iterations).sum()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threads: 512,
            iterations: 1024,
            offset: 0,
            start_delay: Duration::from_millis(5),
            seed: 0,
        }
    }
}

/// The outcome of a stress run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Report {
    /// The counter value the run must produce, see [`Config::expected`].
    pub expected: u64,
    /// The counter value the run did produce.
    pub observed: u64,
}

impl Report {
    /// Returns `true` if the observed counter matches the expectation, that
    /// is, no update was lost.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.expected == self.observed
    }
}

/// The per-thread state of a stress run.
struct Worker<R> {
    counter: Arc<Mutex<u64, R>>,
    id: u64,
    iterations: u64,
    offset: u64,
    start_delay: Duration,
    rng: SmallRng,
}

impl<R: Relax> Worker<R> {
    fn run(mut self) {
        thread::sleep(self.start_delay);
        for _ in 0..self.iterations {
            // Draw outside the critical section, the generator is thread
            // local state.
            let extra = self.rng.gen_range(0..EXTRA_BOUND);
            let mut count = self.counter.lock();
            *count += self.id;
            for _ in 0..extra {
                *count += self.offset;
            }
        }
    }
}

/// Runs the stress workload described by `config` against a [`Mutex`] with
/// the `R` relax strategy and reports the outcome.
///
/// Spawning is fallible: if the OS refuses to create a worker thread, the
/// run is aborted and the error is returned. Workers are joined one by one,
/// and a worker panic surfaces as an error as well.
///
/// # Errors
///
/// Returns an error if a worker thread could not be spawned or panicked.
///
/// # Examples
///
/// ```
/// use ttaslock::harness::{run, Config};
/// use ttaslock::relax::SpinBackoff;
///
/// let config = Config::new(8, 500);
/// let report = run::<SpinBackoff>(&config).unwrap();
/// assert_eq!(report.observed, config.expected());
/// ```
pub fn run<R: Relax + 'static>(config: &Config) -> io::Result<Report> {
    let counter = Arc::new(Mutex::<u64, R>::new(0));

    let mut workers = Vec::with_capacity(config.threads);
    for id in 0..config.threads as u64 {
        let worker = Worker {
            counter: Arc::clone(&counter),
            id,
            iterations: config.iterations,
            offset: config.offset,
            start_delay: config.start_delay,
            rng: SmallRng::seed_from_u64(config.seed.wrapping_add(id)),
        };
        let handle = thread::Builder::new()
            .name(format!("worker-{id}"))
            .spawn(move || worker.run())?;
        workers.push(handle);
    }

    for handle in workers {
        handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "worker thread panicked"))?;
    }

    let observed = counter.lock_then(|count| *count);
    Ok(Report { expected: config.expected(), observed })
}

#[cfg(all(not(loom), test))]
mod test {
    use std::time::Duration;

    use super::{run, Config, Report};
    use crate::relax::Yield;

    fn quick(threads: usize, iterations: u64) -> Config {
        Config { start_delay: Duration::from_millis(1), ..Config::new(threads, iterations) }
    }

    #[test]
    fn expected_matches_closed_form() {
        // id * iterations summed over 0..threads is I * N * (N - 1) / 2.
        for (threads, iterations) in [(1, 1024), (4, 100), (16, 7), (512, 1024)] {
            let config = Config::new(threads, iterations);
            let n = threads as u64;
            assert_eq!(config.expected(), iterations * n * (n - 1) / 2);
        }
    }

    #[test]
    fn expected_reference_shape() {
        assert_eq!(Config::default().expected(), 133_955_584);
    }

    #[test]
    fn expected_degenerate_shapes() {
        assert_eq!(Config::new(0, 1024).expected(), 0);
        assert_eq!(Config::new(1, 1024).expected(), 0);
        assert_eq!(Config::new(512, 0).expected(), 0);
    }

    #[test]
    fn report_passed() {
        assert!(Report { expected: 600, observed: 600 }.passed());
        assert!(!Report { expected: 600, observed: 599 }.passed());
    }

    #[test]
    fn run_no_workers() {
        let report = run::<Yield>(&quick(0, 1024)).unwrap();
        assert_eq!(report.observed, 0);
        assert!(report.passed());
    }

    #[test]
    fn run_single_worker() {
        // Worker id 0 contributes nothing, the counter must stay zero.
        let report = run::<Yield>(&quick(1, 1024)).unwrap();
        assert_eq!(report.observed, 0);
        assert!(report.passed());
    }

    #[test]
    fn run_small_shape_repeatedly() {
        for _ in 0..20 {
            let report = run::<Yield>(&quick(4, 100)).unwrap();
            assert_eq!(report.expected, 600);
            assert_eq!(report.observed, 600);
        }
    }

    #[test]
    fn run_with_different_seed() {
        // The extra additions are no-ops on the counter while the offset is
        // zero, so the expectation holds for any drawn hold times.
        let config = Config { seed: 7, ..quick(8, 250) };
        let report = run::<Yield>(&config).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn run_reference_shape() {
        let report = run::<Yield>(&Config::default()).unwrap();
        assert_eq!(report.observed, 133_955_584);
        assert!(report.passed());
    }
}
