//! Per-operation counters and timings for a cutting session.
//!
//! The session records decode, cut, and compression timings here; the command shell prints a
//! snapshot as JSON when asked.

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

const DEFAULT_SAMPLE_CAPACITY: usize = 128;

/// Bounded window of millisecond samples.
#[derive(Debug, Default)]
struct SampleWindow {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleWindow {
    fn new(capacity: usize) -> Self {
        Self { samples: VecDeque::with_capacity(capacity), capacity }
    }

    fn push(&mut self, duration: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(duration.as_secs_f64() as f32 * 1_000.0);
    }

    fn percentile(&self, percentile: f32) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted: Vec<f32> = self.samples.iter().copied().collect();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let rank = percentile.clamp(0.0, 1.0) * (sorted.len() - 1) as f32;
        sorted.get(rank.round() as usize).copied().unwrap_or(0.0)
    }
}

#[derive(Debug)]
struct StatsInner {
    started_at: Instant,
    decode_ms: SampleWindow,
    cut_ms: SampleWindow,
    compress_ms: SampleWindow,
    sources_cut: u64,
    tiles_produced: u64,
    tiles_compressed: u64,
    bytes_saved: u64,
    failures: u64,
}

impl Default for StatsInner {
    fn default() -> Self {
        Self {
            started_at: Instant::now(),
            decode_ms: SampleWindow::new(DEFAULT_SAMPLE_CAPACITY),
            cut_ms: SampleWindow::new(DEFAULT_SAMPLE_CAPACITY),
            compress_ms: SampleWindow::new(DEFAULT_SAMPLE_CAPACITY),
            sources_cut: 0,
            tiles_produced: 0,
            tiles_compressed: 0,
            bytes_saved: 0,
            failures: 0,
        }
    }
}

/// Thread-safe counters shared between a session and whoever reports on it.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: parking_lot::Mutex<StatsInner>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_decode(&self, duration: Duration) {
        self.inner.lock().decode_ms.push(duration);
    }

    /// Record one source cut into `tiles` tiles.
    pub fn record_cut(&self, duration: Duration, tiles: usize) {
        let mut guard = self.inner.lock();
        guard.cut_ms.push(duration);
        guard.sources_cut = guard.sources_cut.saturating_add(1);
        guard.tiles_produced = guard.tiles_produced.saturating_add(tiles as u64);
    }

    pub fn record_compress(&self, duration: Duration) {
        let mut guard = self.inner.lock();
        guard.compress_ms.push(duration);
        guard.tiles_compressed = guard.tiles_compressed.saturating_add(1);
    }

    pub fn record_saved(&self, bytes: usize) {
        let mut guard = self.inner.lock();
        guard.bytes_saved = guard.bytes_saved.saturating_add(bytes as u64);
    }

    pub fn record_failure(&self) {
        let mut guard = self.inner.lock();
        guard.failures = guard.failures.saturating_add(1);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let guard = self.inner.lock();
        StatsSnapshot {
            uptime_ms: guard.started_at.elapsed().as_millis() as u64,
            decode_ms_p50: guard.decode_ms.percentile(0.50),
            decode_ms_p95: guard.decode_ms.percentile(0.95),
            cut_ms_p50: guard.cut_ms.percentile(0.50),
            cut_ms_p95: guard.cut_ms.percentile(0.95),
            compress_ms_p50: guard.compress_ms.percentile(0.50),
            compress_ms_p95: guard.compress_ms.percentile(0.95),
            sources_cut: guard.sources_cut,
            tiles_produced: guard.tiles_produced,
            tiles_compressed: guard.tiles_compressed,
            bytes_saved: guard.bytes_saved,
            failures: guard.failures,
        }
    }
}

/// Point-in-time copy of the collected statistics.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub uptime_ms: u64,
    pub decode_ms_p50: f32,
    pub decode_ms_p95: f32,
    pub cut_ms_p50: f32,
    pub cut_ms_p95: f32,
    pub compress_ms_p50: f32,
    pub compress_ms_p95: f32,
    pub sources_cut: u64,
    pub tiles_produced: u64,
    pub tiles_compressed: u64,
    pub bytes_saved: u64,
    pub failures: u64,
}
