//! Prometheus registry for a ridefleet process.
//!
//! `handoffs_total` is a genuine live counter, incremented by the HTTP
//! layer at the moment each handoff completes. `buffer_depth` and
//! `health_probe_failures_total` are gauges set immediately before each
//! scrape from state that already lives elsewhere (the coordinator's
//! buffer, the health monitor's failure counts) rather than mirrored
//! live into a second counter.

use prometheus::{Encoder, IntCounterVec, IntGauge, IntGaugeVec, Opts, Registry, TextEncoder};
use ridefleet_types::Region;

pub struct Metrics {
    registry: Registry,
    up: IntGauge,
    pub handoffs_total: IntCounterVec,
    buffer_depth: IntGaugeVec,
    health_probe_failures_total: IntGaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let up = IntGauge::new("ridefleet_up", "1 while this process is serving requests")
            .expect("valid metric");
        let handoffs_total = IntCounterVec::new(
            Opts::new("handoffs_total", "Completed handoffs by outcome status"),
            &["status"],
        )
        .expect("valid metric");
        let buffer_depth = IntGaugeVec::new(
            Opts::new("buffer_depth", "Buffered handoffs currently waiting per target region"),
            &["region"],
        )
        .expect("valid metric");
        let health_probe_failures_total = IntGaugeVec::new(
            Opts::new("health_probe_failures_total", "Cumulative failed health probes per region"),
            &["region"],
        )
        .expect("valid metric");

        registry.register(Box::new(up.clone())).expect("register up");
        registry
            .register(Box::new(handoffs_total.clone()))
            .expect("register handoffs_total");
        registry
            .register(Box::new(buffer_depth.clone()))
            .expect("register buffer_depth");
        registry
            .register(Box::new(health_probe_failures_total.clone()))
            .expect("register health_probe_failures_total");
        up.set(1);

        Self {
            registry,
            up,
            handoffs_total,
            buffer_depth,
            health_probe_failures_total,
        }
    }

    /// Overwrites the `buffer_depth` gauge for every region named in
    /// `depths`, in one pass, so a scrape never sees a mix of this round's
    /// values and a stale region that since emptied. Callers pass the full
    /// buffer snapshot, not a delta.
    pub fn set_buffer_depths<'a>(&self, depths: impl IntoIterator<Item = (&'a Region, usize)>) {
        self.buffer_depth.reset();
        for (region, depth) in depths {
            self.buffer_depth
                .with_label_values(&[region.as_str()])
                .set(depth as i64);
        }
    }

    /// Overwrites `health_probe_failures_total` for every region in
    /// `failures`, same reset-then-set discipline as
    /// [`Metrics::set_buffer_depths`].
    pub fn set_probe_failures<'a>(&self, failures: impl IntoIterator<Item = (&'a Region, u64)>) {
        self.health_probe_failures_total.reset();
        for (region, count) in failures {
            self.health_probe_failures_total
                .with_label_values(&[region.as_str()])
                .set(count as i64);
        }
    }

    /// Renders every registered metric in Prometheus text exposition
    /// format.
    pub fn render(&self) -> String {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new()
            .encode(&families, &mut buf)
            .expect("prometheus text encoding never fails for well-formed metrics");
        String::from_utf8(buf).expect("prometheus text encoder emits valid utf-8")
    }

    pub fn mark_up(&self) {
        self.up.set(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
