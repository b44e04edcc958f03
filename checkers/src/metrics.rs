//! Timing metrics
//!
//! The components which do measurable work accept a `&mut dyn Metrics` and report named events
//! to it. Use [`NullMetrics`] to discard the events or [`TimingMetrics`] to aggregate them.

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Collector of timed events
pub trait Metrics {
    fn record(&mut self, event: &'static str, elapsed: Duration);
}

/// Metrics collector which discards everything
#[derive(Debug, Default, Copy, Clone)]
pub struct NullMetrics;

impl Metrics for NullMetrics {
    #[inline]
    fn record(&mut self, _event: &'static str, _elapsed: Duration) {}
}

/// Aggregated statistics of a single event
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct EventStats {
    pub calls: u64,
    pub total: Duration,
}

impl EventStats {
    pub fn avg(&self) -> Duration {
        match self.calls {
            0 => Duration::ZERO,
            calls => self.total / calls as u32,
        }
    }
}

/// Metrics collector which counts the calls and their durations per event
#[derive(Debug, Default, Clone)]
pub struct TimingMetrics {
    events: BTreeMap<&'static str, EventStats>,
}

impl TimingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event: &str) -> Option<&EventStats> {
        self.events.get(event)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &EventStats)> + '_ {
        self.events.iter().map(|(k, v)| (*k, v))
    }

    /// Returns the wrapper which formats the collected stats as a table
    pub fn report(&self) -> Report<'_> {
        Report(self)
    }
}

impl Metrics for TimingMetrics {
    fn record(&mut self, event: &'static str, elapsed: Duration) {
        let stats = self.events.entry(event).or_default();
        stats.calls += 1;
        stats.total += elapsed;
    }
}

pub struct Report<'a>(&'a TimingMetrics);

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        writeln!(
            f,
            "{:<16} {:>8} {:>14} {:>14}",
            "event", "calls", "total", "average"
        )?;
        for (event, stats) in self.0.iter() {
            writeln!(
                f,
                "{:<16} {:>8} {:>14} {:>14}",
                event,
                stats.calls,
                format!("{:?}", stats.total),
                format!("{:?}", stats.avg()),
            )?;
        }
        Ok(())
    }
}

/// Measures the time since its creation and reports it as an event
pub struct Stopwatch {
    event: &'static str,
    start: Instant,
}

impl Stopwatch {
    pub fn start(event: &'static str) -> Self {
        Stopwatch {
            event,
            start: Instant::now(),
        }
    }

    pub fn stop(self, metrics: &mut dyn Metrics) -> Duration {
        let elapsed = self.start.elapsed();
        metrics.record(self.event, elapsed);
        elapsed
    }
}

/// Runs `f` and records its duration as `event`
pub fn measure<T>(metrics: &mut dyn Metrics, event: &'static str, f: impl FnOnce() -> T) -> T {
    let watch = Stopwatch::start(event);
    let res = f();
    watch.stop(metrics);
    res
}
