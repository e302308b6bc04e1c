/*!
 * Tracing Setup
 * Structured tracing for the simulation loop using the tracing crate
 *
 * Features:
 * - JSON-formatted logs for structured parsing
 * - Tick spans with duration fields
 * - Overrun detection when a tick exceeds its interval
 */

use crate::core::types::Ticks;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - SIM_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::FULL),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        // Human-readable output for development
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .init();
        info!("Structured tracing initialized");
    }
}

/// Span covering one simulation tick.
///
/// Dropped when the tick's work is done; logs a warning when the work
/// took longer than the tick interval, since at that point the loop can
/// no longer keep its cadence.
pub struct TickSpan {
    _span: tracing::Span,
    start: Instant,
    tick: Ticks,
    budget: Duration,
}

impl TickSpan {
    pub fn new(tick: Ticks, budget: Duration) -> Self {
        let span = span!(
            Level::DEBUG,
            "tick",
            tick = tick,
            duration_us = tracing::field::Empty,
            admitted = tracing::field::Empty,
            completed = tracing::field::Empty,
        );

        Self {
            _span: span,
            start: Instant::now(),
            tick,
            budget,
        }
    }

    /// Record how many processes were admitted during the tick
    pub fn record_admitted(&self, count: usize) {
        self._span.record("admitted", count);
    }

    /// Record how many processes completed during the tick
    pub fn record_completed(&self, count: usize) {
        self._span.record("completed", count);
    }
}

impl Drop for TickSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self._span.enter();
        self._span.record("duration_us", duration.as_micros() as u64);

        if duration > self.budget {
            warn!(
                tick = self.tick,
                duration_ms = duration.as_millis() as u64,
                budget_ms = self.budget.as_millis() as u64,
                "tick overran its interval"
            );
        } else {
            debug!(
                tick = self.tick,
                duration_us = duration.as_micros() as u64,
                "tick completed"
            );
        }
    }
}

/// Helper to open a tick span
#[inline]
pub fn span_tick(tick: Ticks, budget: Duration) -> TickSpan {
    TickSpan::new(tick, budget)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_tracing() {
        let _ = tracing_subscriber::registry()
            .with(EnvFilter::new("debug"))
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init();
    }

    #[test]
    fn test_tick_span() {
        init_test_tracing();

        let span = span_tick(1, Duration::from_millis(450));
        span.record_admitted(2);
        span.record_completed(1);
        // Span will be dropped and logged with structured fields
    }

    #[test]
    fn test_overrun_detection() {
        init_test_tracing();

        let span = span_tick(2, Duration::from_micros(10));
        std::thread::sleep(Duration::from_millis(2));
        drop(span);
        // Should log a warning for the overrun
    }
}
