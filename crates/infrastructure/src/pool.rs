//! Shadow server pool: the fixed target set, per-server smoothed RTT and
//! the per-query target orderings.

use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use rootdiff_domain::{ReplayError, SelectionPolicy, ServerTarget};
use tracing::debug;

/// Sentinel for servers that have never completed an exchange. Sorted ahead
/// of every measured value so fresh servers get tried first.
const SRTT_UNTESTED_MS: f64 = f64::INFINITY;

/// EWMA weight for new measurements.
const SRTT_ALPHA: f64 = 1.0 / 8.0;

#[derive(Debug)]
pub struct TargetPool {
    targets: Vec<ServerTarget>,
    srtt: DashMap<IpAddr, f64>,
    cursor: AtomicUsize,
    policy: SelectionPolicy,
}

impl TargetPool {
    pub fn new(policy: SelectionPolicy, targets: Vec<ServerTarget>) -> Result<Self, ReplayError> {
        if targets.is_empty() {
            return Err(ReplayError::Config("shadow server pool is empty".into()));
        }
        let srtt = DashMap::new();
        for target in &targets {
            if srtt.insert(target.addr, SRTT_UNTESTED_MS).is_some() {
                return Err(ReplayError::Config(format!(
                    "duplicate shadow server address {}",
                    target.addr
                )));
            }
        }
        Ok(Self {
            targets,
            srtt,
            cursor: AtomicUsize::new(0),
            policy,
        })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Ordered targets to try for one replayed query.
    pub fn next(&self) -> Vec<ServerTarget> {
        match self.policy {
            SelectionPolicy::RoundRobin => self.rotated(),
            SelectionPolicy::SrttPreferred => self.by_srtt(),
        }
    }

    /// Full list with the lead element advanced by one per call, so over N
    /// calls every target leads exactly once.
    fn rotated(&self) -> Vec<ServerTarget> {
        let lead = self.cursor.fetch_add(1, Ordering::Relaxed) % self.targets.len();
        let mut out = Vec::with_capacity(self.targets.len());
        out.extend_from_slice(&self.targets[lead..]);
        out.extend_from_slice(&self.targets[..lead]);
        out
    }

    /// Ascending smoothed RTT; untested servers first, insertion order
    /// breaking ties.
    fn by_srtt(&self) -> Vec<ServerTarget> {
        let mut order: Vec<usize> = (0..self.targets.len()).collect();
        order.sort_by(|&a, &b| {
            let srtt_a = self.raw_srtt(self.targets[a].addr);
            let srtt_b = self.raw_srtt(self.targets[b].addr);
            let tested_a = srtt_a != SRTT_UNTESTED_MS;
            let tested_b = srtt_b != SRTT_UNTESTED_MS;
            tested_a
                .cmp(&tested_b)
                .then(srtt_a.total_cmp(&srtt_b))
                .then(a.cmp(&b))
        });
        order
            .into_iter()
            .map(|i| self.targets[i].clone())
            .collect()
    }

    /// Fold a measured round-trip time into the server's smoothed RTT.
    ///
    /// The first measurement replaces the sentinel; afterwards
    /// `srtt' = measured/8 + srtt * 7/8`. Unknown addresses are ignored.
    pub fn update_srtt(&self, addr: IpAddr, rtt: Duration) {
        let measured = rtt.as_secs_f64() * 1000.0;
        if let Some(mut entry) = self.srtt.get_mut(&addr) {
            let current = *entry;
            *entry = if current == SRTT_UNTESTED_MS {
                measured
            } else {
                measured * SRTT_ALPHA + current * (1.0 - SRTT_ALPHA)
            };
            debug!(server = %addr, srtt_ms = *entry, "updated SRTT");
        }
    }

    /// Smoothed RTT in milliseconds, if the server has been measured.
    pub fn srtt_ms(&self, addr: IpAddr) -> Option<f64> {
        self.srtt
            .get(&addr)
            .map(|v| *v)
            .filter(|v| *v != SRTT_UNTESTED_MS)
    }

    fn raw_srtt(&self, addr: IpAddr) -> f64 {
        self.srtt.get(&addr).map(|v| *v).unwrap_or(SRTT_UNTESTED_MS)
    }
}
