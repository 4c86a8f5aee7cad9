//! Continuous polling loop.
//!
//! The loop runs a collection cycle, then waits one interval, until the
//! requested count is reached or the interrupt future resolves. There is no
//! wait after the final cycle and no drift correction: each wait starts when
//! the previous cycle finishes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

/// How often and how many times to sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorPlan {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Number of cycles, unbounded when `None`.
    pub count: Option<u64>,
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// The requested number of cycles ran.
    Completed {
        /// Cycles completed.
        samples: u64,
    },
    /// The interrupt fired first.
    Interrupted {
        /// Cycles completed before the interrupt.
        samples: u64,
    },
}

impl MonitorOutcome {
    /// Cycles completed either way.
    #[must_use]
    pub const fn samples(self) -> u64 {
        match self {
            Self::Completed { samples } | Self::Interrupted { samples } => samples,
        }
    }
}

/// Waits between cycles.
#[async_trait]
pub trait Ticker: Send {
    /// Wait for `interval`.
    async fn tick(&mut self, interval: Duration);
}

/// [`Ticker`] backed by `tokio::time::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioTicker;

#[async_trait]
impl Ticker for TokioTicker {
    async fn tick(&mut self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// One collection cycle: collect, render, export.
#[async_trait]
pub trait MonitorCycle: Send {
    /// Error that aborts the loop.
    type Error: Send;

    /// Run cycle number `sample` (starting at 1).
    async fn run_cycle(&mut self, sample: u64) -> Result<(), Self::Error>;
}

/// Drive `cycle` according to `plan` until done or interrupted.
///
/// # Errors
///
/// Returns the first error produced by `cycle`.
pub async fn monitor<C, T, I>(
    plan: MonitorPlan,
    cycle: &mut C,
    ticker: &mut T,
    interrupt: I,
) -> Result<MonitorOutcome, C::Error>
where
    C: MonitorCycle + ?Sized,
    T: Ticker + ?Sized,
    I: Future<Output = ()>,
{
    tokio::pin!(interrupt);
    let done = |samples: u64| plan.count.is_some_and(|count| samples >= count);
    let mut samples = 0_u64;
    info!(interval_secs = plan.interval.as_secs_f64(), count = ?plan.count, "monitoring started");

    while !done(samples) {
        tokio::select! {
            biased;
            () = &mut interrupt => return Ok(MonitorOutcome::Interrupted { samples }),
            result = cycle.run_cycle(samples + 1) => result?,
        }
        samples += 1;

        if done(samples) {
            break;
        }
        tokio::select! {
            biased;
            () = &mut interrupt => return Ok(MonitorOutcome::Interrupted { samples }),
            () = ticker.tick(plan.interval) => {}
        }
    }

    info!(samples, "monitoring finished");
    Ok(MonitorOutcome::Completed { samples })
}
