// SPDX-License-Identifier: MIT
//
// QRNG Client: Quantum Random Numbers over HTTP
// Copyright (c) 2025 Valer Bocan, PhD, CSSLP
// Email: valer.bocan@upt.ro
//
// Department of Computer and Information Technology
// Politehnica University of Timisoara
//
// https://github.com/vbocan/qrng-data-diode

//! Client-side request counters
//!
//! Shared between clones of a client. Counters only observe traffic; they never
//! influence request behaviour.

use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const LATENCY_WINDOW: usize = 1000;

/// Request metrics collector
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    requests_total: AtomicU64,
    requests_failed: AtomicU64,
    values_received: AtomicU64,

    // Bounded sampler
    sampler_draws: AtomicU64,
    sampler_rejections: AtomicU64,

    // Round-trip latency (microseconds)
    request_latencies: RwLock<Vec<u64>>,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub requests_failed: u64,
    pub values_received: u64,
    pub sampler_draws: u64,
    pub sampler_rejections: u64,
    pub latency_p50_micros: Option<u64>,
    pub latency_p99_micros: Option<u64>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("requests_total", &self.requests_total())
            .field("requests_failed", &self.requests_failed())
            .finish()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_total: AtomicU64::new(0),
                requests_failed: AtomicU64::new(0),
                values_received: AtomicU64::new(0),
                sampler_draws: AtomicU64::new(0),
                sampler_rejections: AtomicU64::new(0),
                request_latencies: RwLock::new(Vec::with_capacity(LATENCY_WINDOW)),
            }),
        }
    }

    // Request metrics
    pub fn record_request(&self, values: usize, latency_micros: u64) {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
        self.inner
            .values_received
            .fetch_add(values as u64, Ordering::Relaxed);

        let mut latencies = self.inner.request_latencies.write();
        latencies.push(latency_micros);
        if latencies.len() > LATENCY_WINDOW {
            latencies.drain(0..LATENCY_WINDOW / 2);
        }
    }

    pub fn record_request_failure(&self) {
        self.inner.requests_total.fetch_add(1, Ordering::Relaxed);
        self.inner.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn requests_total(&self) -> u64 {
        self.inner.requests_total.load(Ordering::Relaxed)
    }

    pub fn requests_failed(&self) -> u64 {
        self.inner.requests_failed.load(Ordering::Relaxed)
    }

    pub fn values_received(&self) -> u64 {
        self.inner.values_received.load(Ordering::Relaxed)
    }

    // Sampler metrics
    pub fn record_draw(&self, accepted: bool) {
        self.inner.sampler_draws.fetch_add(1, Ordering::Relaxed);
        if !accepted {
            self.inner.sampler_rejections.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn sampler_draws(&self) -> u64 {
        self.inner.sampler_draws.load(Ordering::Relaxed)
    }

    pub fn sampler_rejections(&self) -> u64 {
        self.inner.sampler_rejections.load(Ordering::Relaxed)
    }

    pub fn latency_percentile(&self, percentile: f64) -> Option<u64> {
        let latencies = self.inner.request_latencies.read();
        if latencies.is_empty() {
            return None;
        }

        let mut sorted = latencies.clone();
        sorted.sort_unstable();
        let index = ((sorted.len() as f64 * percentile).ceil() as usize).min(sorted.len() - 1);
        Some(sorted[index])
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total(),
            requests_failed: self.requests_failed(),
            values_received: self.values_received(),
            sampler_draws: self.sampler_draws(),
            sampler_rejections: self.sampler_rejections(),
            latency_p50_micros: self.latency_percentile(0.50),
            latency_p99_micros: self.latency_percentile(0.99),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = Metrics::new();

        metrics.record_request(8, 100);
        metrics.record_request(16, 200);
        metrics.record_request_failure();

        assert_eq!(metrics.requests_total(), 3);
        assert_eq!(metrics.requests_failed(), 1);
        assert_eq!(metrics.values_received(), 24);
    }

    #[test]
    fn test_sampler_counts() {
        let metrics = Metrics::new();
        metrics.record_draw(false);
        metrics.record_draw(false);
        metrics.record_draw(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.sampler_draws, 3);
        assert_eq!(snapshot.sampler_rejections, 2);
    }

    #[test]
    fn test_latency_percentiles() {
        let metrics = Metrics::new();
        assert_eq!(metrics.latency_percentile(0.5), None);

        for i in 1..=100 {
            metrics.record_request(1, i);
        }

        let p50 = metrics.latency_percentile(0.50).unwrap();
        assert!((45..=55).contains(&p50));

        let p99 = metrics.latency_percentile(0.99).unwrap();
        assert!((95..=100).contains(&p99));
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        clone.record_request(4, 10);
        assert_eq!(metrics.requests_total(), 1);
    }
}
