//! In-process per-date mutual exclusion for check-then-write sequences.

use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

const PRUNE_THRESHOLD: usize = 256;

/// Registry of one async mutex per calendar date.
///
/// Only serialises writers inside this process; several server processes
/// sharing one database still race.
#[derive(Debug, Default)]
pub struct DateLocks {
    inner: DashMap<NaiveDate, Arc<Mutex<()>>>,
}

/// Held locks; released on drop.
#[must_use]
pub struct DateGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl DateLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn handle(&self, date: NaiveDate) -> Arc<Mutex<()>> {
        if self.inner.len() > PRUNE_THRESHOLD {
            // idle entries are referenced only by the map
            self.inner.retain(|_, m| Arc::strong_count(m) > 1);
        }
        self.inner.entry(date).or_default().clone()
    }

    pub async fn lock(&self, date: NaiveDate) -> DateGuard {
        let guard = self.handle(date).lock_owned().await;
        DateGuard {
            _guards: vec![guard],
        }
    }

    /// Lock two dates in ascending order so concurrent movers cannot deadlock.
    pub async fn lock_pair(&self, a: NaiveDate, b: NaiveDate) -> DateGuard {
        if a == b {
            return self.lock(a).await;
        }
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let g1 = self.handle(first).lock_owned().await;
        let g2 = self.handle(second).lock_owned().await;
        DateGuard {
            _guards: vec![g1, g2],
        }
    }

    pub fn tracked_dates(&self) -> usize {
        self.inner.len()
    }
}
