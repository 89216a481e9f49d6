//! Runs the contention stress harness and reports whether any counter update
//! was lost.
//!
//! ```text
//! usage: ttas-stress [THREAD_COUNT] [ITERATIONS]
//! ```
//!
//! Exits with 0 when the observed counter matches the expectation, 1 on a
//! mismatch or bad usage, and 2 when a worker thread could not be spawned.

use std::env;
use std::process::ExitCode;
use std::str::FromStr;

use ttaslock::harness::{run, Config};
use ttaslock::relax::SpinBackoff;

const USAGE: &str = "usage: ttas-stress [THREAD_COUNT] [ITERATIONS]";

fn parse<T: FromStr>(arg: Option<String>, default: T) -> Result<T, String> {
    match arg {
        Some(arg) => arg.parse().map_err(|_| arg),
        None => Ok(default),
    }
}

fn usage(arg: &str) -> ExitCode {
    eprintln!("invalid argument: {arg}");
    eprintln!("{USAGE}");
    ExitCode::FAILURE
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let threads = match parse(args.next(), 512) {
        Ok(threads) => threads,
        Err(arg) => return usage(&arg),
    };
    let iterations = match parse(args.next(), 1024) {
        Ok(iterations) => iterations,
        Err(arg) => return usage(&arg),
    };
    if let Some(arg) = args.next() {
        return usage(&arg);
    }

    let config = Config::new(threads, iterations);
    let report = match run::<SpinBackoff>(&config) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("failed to run workers: {err}");
            return ExitCode::from(2);
        }
    };

    println!("Expected value: {}", report.expected);
    println!("Global value: {}", report.observed);

    if report.passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
