use std::collections::VecDeque;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, HeaderValue};
use dashmap::DashMap;

/// Per-IP contact rate limiter using a rolling window.
///
/// Every accepted hit is remembered until it falls out of the window, so the
/// ceiling applies to any window-long span, not to fixed buckets.
pub struct ContactRateLimiter {
    /// ip -> timestamps of hits still inside the window, oldest first
    entries: DashMap<IpAddr, VecDeque<Instant>>,
    limit: u32,
    window: Duration,
}

/// Quota snapshot reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the oldest hit leaves the window.
    pub reset_after: u64,
}

impl ContactRateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    /// Record a hit for `ip`. Returns the remaining quota, or Err with the
    /// quota (remaining = 0) when the ceiling is already reached. Rejected
    /// hits are not recorded.
    pub fn check(&self, ip: IpAddr) -> Result<Quota, Quota> {
        self.check_at(ip, Instant::now())
    }

    fn check_at(&self, ip: IpAddr, now: Instant) -> Result<Quota, Quota> {
        let mut entry = self.entries.entry(ip).or_default();
        let hits = entry.value_mut();

        while hits
            .front()
            .is_some_and(|first| now.duration_since(*first) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() as u32 >= self.limit {
            return Err(Quota {
                limit: self.limit,
                remaining: 0,
                reset_after: self.reset_after(hits, now),
            });
        }

        hits.push_back(now);
        Ok(Quota {
            limit: self.limit,
            remaining: self.limit - hits.len() as u32,
            reset_after: self.reset_after(hits, now),
        })
    }

    fn reset_after(&self, hits: &VecDeque<Instant>, now: Instant) -> u64 {
        hits.front()
            .map(|first| {
                self.window
                    .saturating_sub(now.duration_since(*first))
                    .as_secs_f64()
                    .ceil() as u64
            })
            .unwrap_or(self.window.as_secs())
    }

    /// Drop addresses whose latest hit has left the window.
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.entries.retain(|_, hits| {
            hits.back()
                .is_some_and(|last| now.duration_since(*last) < self.window)
        });
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

impl Quota {
    /// Write `RateLimit-*` headers, plus `Retry-After` once the quota is spent.
    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert("ratelimit-limit", HeaderValue::from(self.limit));
        headers.insert("ratelimit-remaining", HeaderValue::from(self.remaining));
        headers.insert("ratelimit-reset", HeaderValue::from(self.reset_after));
        if self.remaining == 0 {
            headers.insert("retry-after", HeaderValue::from(self.reset_after));
        }
    }
}
