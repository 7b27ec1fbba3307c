use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Metrics registry for the application.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Total calculation requests processed
    pub calculations_total: AtomicU64,

    /// Calculations that produced an empty result list
    pub calculations_empty: AtomicU64,

    /// Requests rejected for invalid input
    pub invalid_inputs_total: AtomicU64,

    /// Calculations whose top result hit a cap
    pub winners_capped_total: AtomicU64,

    /// Calculation latency buckets (microseconds)
    pub latency_under_1ms: AtomicU64,
    pub latency_1_5ms: AtomicU64,
    pub latency_5_10ms: AtomicU64,
    pub latency_10_50ms: AtomicU64,
    pub latency_50_100ms: AtomicU64,
    pub latency_over_100ms: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        MetricsRegistry::default()
    }

    /// Record the outcome of one completed calculation.
    pub fn record_calculation(&self, result_count: usize, top_capped: bool) {
        self.calculations_total.fetch_add(1, Ordering::Relaxed);
        if result_count == 0 {
            self.calculations_empty.fetch_add(1, Ordering::Relaxed);
        }
        if top_capped {
            self.winners_capped_total.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_invalid_input(&self) {
        self.invalid_inputs_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record calculation latency.
    pub fn record_latency(&self, start: Instant) {
        let micros = start.elapsed().as_micros() as u64;

        if micros < 1000 {
            self.latency_under_1ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 5000 {
            self.latency_1_5ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 10000 {
            self.latency_5_10ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 50000 {
            self.latency_10_50ms.fetch_add(1, Ordering::Relaxed);
        } else if micros < 100000 {
            self.latency_50_100ms.fetch_add(1, Ordering::Relaxed);
        } else {
            self.latency_over_100ms.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, uptime_secs: u64, cards: usize, rules: usize) -> String {
        format!(
            r#"# HELP cardrank_uptime_seconds Application uptime in seconds
# TYPE cardrank_uptime_seconds counter
cardrank_uptime_seconds {}

# HELP cardrank_calculations_total Total calculation requests processed
# TYPE cardrank_calculations_total counter
cardrank_calculations_total {}

# HELP cardrank_calculations_empty_total Calculations with no results
# TYPE cardrank_calculations_empty_total counter
cardrank_calculations_empty_total {}

# HELP cardrank_invalid_inputs_total Requests rejected for invalid input
# TYPE cardrank_invalid_inputs_total counter
cardrank_invalid_inputs_total {}

# HELP cardrank_winners_capped_total Calculations whose top result was capped
# TYPE cardrank_winners_capped_total counter
cardrank_winners_capped_total {}

# HELP cardrank_catalog_cards Cards in the active catalog
# TYPE cardrank_catalog_cards gauge
cardrank_catalog_cards {}

# HELP cardrank_catalog_rules Validated rules in the active catalog
# TYPE cardrank_catalog_rules gauge
cardrank_catalog_rules {}

# HELP cardrank_latency_bucket Calculation latency distribution
# TYPE cardrank_latency_bucket counter
cardrank_latency_bucket{{le="1ms"}} {}
cardrank_latency_bucket{{le="5ms"}} {}
cardrank_latency_bucket{{le="10ms"}} {}
cardrank_latency_bucket{{le="50ms"}} {}
cardrank_latency_bucket{{le="100ms"}} {}
cardrank_latency_bucket{{le="+Inf"}} {}
"#,
            uptime_secs,
            self.calculations_total.load(Ordering::Relaxed),
            self.calculations_empty.load(Ordering::Relaxed),
            self.invalid_inputs_total.load(Ordering::Relaxed),
            self.winners_capped_total.load(Ordering::Relaxed),
            cards,
            rules,
            self.latency_under_1ms.load(Ordering::Relaxed),
            self.latency_1_5ms.load(Ordering::Relaxed),
            self.latency_5_10ms.load(Ordering::Relaxed),
            self.latency_10_50ms.load(Ordering::Relaxed),
            self.latency_50_100ms.load(Ordering::Relaxed),
            self.latency_over_100ms.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_calculation() {
        let registry = MetricsRegistry::new();
        registry.record_calculation(3, false);
        registry.record_calculation(0, true);

        assert_eq!(registry.calculations_total.load(Ordering::Relaxed), 2);
        assert_eq!(registry.calculations_empty.load(Ordering::Relaxed), 1);
        assert_eq!(registry.winners_capped_total.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_latency_buckets() {
        let registry = MetricsRegistry::new();
        registry.record_latency(Instant::now());
        assert_eq!(registry.latency_under_1ms.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_render_contains_counters() {
        let registry = MetricsRegistry::new();
        registry.record_invalid_input();

        let text = registry.render(42, 10, 25);
        assert!(text.contains("cardrank_uptime_seconds 42"));
        assert!(text.contains("cardrank_invalid_inputs_total 1"));
        assert!(text.contains("cardrank_catalog_cards 10"));
    }
}
