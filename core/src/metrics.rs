use crate::utils::misc::{Typename, format_duration, get_unix_secs_now};
use scc::HashIndex as SccHashIndex;
use scc::ebr::Guard;
use serde_json::Value;
use std::collections::HashMap as StdHashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// Process-wide explorer counters, exposed as JSON and Prometheus text
pub struct Metrics {
    connects: AtomicU64,
    stats_loads: AtomicU64,
    trade_queries: AtomicU64,
    decrypt_attempts: AtomicU64,
    decrypt_successes: AtomicU64,

    // error counters by type name (dynamic)
    errors: SccHashIndex<String, Arc<AtomicU64>>,

    start_time: u32,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            connects: AtomicU64::new(0),
            stats_loads: AtomicU64::new(0),
            trade_queries: AtomicU64::new(0),
            decrypt_attempts: AtomicU64::new(0),
            decrypt_successes: AtomicU64::new(0),
            errors: SccHashIndex::new(),
            start_time: get_unix_secs_now(),
        }
    }

    pub fn add_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_stats_load(&self) {
        self.stats_loads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_trade_query(&self) {
        self.trade_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_decrypt(&self, ok: bool) {
        self.decrypt_attempts.fetch_add(1, Ordering::Relaxed);
        if ok {
            self.decrypt_successes.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Count a failure under its variant name; the message never carries secrets
    pub fn add_error<E: Debug + Typename>(&self, error: &E) {
        warn!(target = "metrics", "explorer error: {error:?}");
        Self::bump(&self.errors, error.typename());
    }

    pub fn error_count(&self, typename: &str) -> u64 {
        self.errors.peek_with(typename, |_, c| c.load(Ordering::Relaxed)).unwrap_or(0)
    }

    fn bump(index: &SccHashIndex<String, Arc<AtomicU64>>, name: &str) {
        // scc HashIndex hands out shared refs only, so counters live behind Arc
        let owned = name.to_string();
        if let Some(counter) = index.get(&owned) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else if index.insert(owned.clone(), Arc::new(AtomicU64::new(1))).is_err() {
            // lost the race against another inserter
            if let Some(counter) = index.get(&owned) {
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(index: &SccHashIndex<String, Arc<AtomicU64>>) -> StdHashMap<String, u64> {
        let guard = Guard::new();
        let mut out = StdHashMap::new();
        let mut iter = index.iter(&guard);
        while let Some((name, counter)) = iter.next() {
            out.insert(name.clone(), counter.load(Ordering::Relaxed));
        }
        out
    }

    pub fn uptime(&self) -> u32 {
        get_unix_secs_now().saturating_sub(self.start_time)
    }

    pub fn get_json(&self) -> Value {
        serde_json::json!({
            "connects": self.connects.load(Ordering::Relaxed),
            "stats_loads": self.stats_loads.load(Ordering::Relaxed),
            "trade_queries": self.trade_queries.load(Ordering::Relaxed),
            "decrypts": {
                "attempts": self.decrypt_attempts.load(Ordering::Relaxed),
                "succeeded": self.decrypt_successes.load(Ordering::Relaxed),
            },
            "errors": Self::snapshot(&self.errors),
            "uptime": self.uptime(),
            "uptime_human": format_duration(self.uptime()),
        })
    }

    pub fn get_prometheus(&self) -> String {
        let mut lines = vec![
            "# HELP kod_explorer_trade_queries_total Trade lookups served".to_string(),
            "# TYPE kod_explorer_trade_queries_total counter".to_string(),
            format!("kod_explorer_trade_queries_total {}", self.trade_queries.load(Ordering::Relaxed)),
            "# HELP kod_explorer_decrypts_total Contract decrypt attempts by outcome".to_string(),
            "# TYPE kod_explorer_decrypts_total counter".to_string(),
            format!("kod_explorer_decrypts_total{{outcome=\"ok\"}} {}", self.decrypt_successes.load(Ordering::Relaxed)),
            format!(
                "kod_explorer_decrypts_total{{outcome=\"failed\"}} {}",
                self.decrypt_attempts.load(Ordering::Relaxed).saturating_sub(self.decrypt_successes.load(Ordering::Relaxed))
            ),
            "# HELP kod_explorer_connects_total Node connections opened".to_string(),
            "# TYPE kod_explorer_connects_total counter".to_string(),
            format!("kod_explorer_connects_total {}", self.connects.load(Ordering::Relaxed)),
        ];

        lines.push("# HELP kod_explorer_errors_total Failures by error type".into());
        lines.push("# TYPE kod_explorer_errors_total counter".into());
        let mut errors: Vec<_> = Self::snapshot(&self.errors).into_iter().collect();
        errors.sort();
        lines.extend(errors.into_iter().map(|(t, c)| format!("kod_explorer_errors_total{{type=\"{t}\"}} {c}")));

        lines.push("# HELP kod_explorer_uptime_seconds Process uptime in seconds".into());
        lines.push("# TYPE kod_explorer_uptime_seconds gauge".into());
        lines.push(format!("kod_explorer_uptime_seconds {}", self.uptime()));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum Boom {
        Wrong,
    }

    impl Typename for Boom {
        fn typename(&self) -> &'static str {
            "Wrong"
        }
    }

    #[test]
    fn error_counters_by_typename() {
        let m = Metrics::new();
        m.add_error(&Boom::Wrong);
        m.add_error(&Boom::Wrong);
        assert_eq!(m.error_count("Wrong"), 2);
        assert_eq!(m.error_count("Other"), 0);
        let j = m.get_json();
        assert_eq!(j["errors"]["Wrong"].as_u64(), Some(2));
    }

    #[test]
    fn decrypt_outcomes_and_prometheus() {
        let m = Metrics::new();
        m.add_decrypt(true);
        m.add_decrypt(false);
        m.add_decrypt(false);
        m.add_connect();
        let j = m.get_json();
        assert_eq!(j["decrypts"]["attempts"].as_u64(), Some(3));
        assert_eq!(j["decrypts"]["succeeded"].as_u64(), Some(1));

        let prom = m.get_prometheus();
        assert!(prom.contains("kod_explorer_decrypts_total{outcome=\"failed\"} 2"));
        assert!(prom.contains("kod_explorer_connects_total 1"));
    }
}
