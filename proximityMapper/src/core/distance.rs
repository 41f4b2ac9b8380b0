use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use geo::{Distance, Geodesic};
use parking_lot::RwLock;

use crate::models::coordinate::{Coordinate, CoordinateKey};
use crate::utils::traits::DistanceSource;

type PairKey = (CoordinateKey, CoordinateKey);

/// Memoizing WGS84 geodesic distance (Karney's algorithm through `geo`).
///
/// Entries are keyed by the unordered coordinate pair and never change once
/// written, so the cache only grows. It is owned by whoever runs a matching
/// session and handed to the matcher; share it behind a reference or an
/// `Arc` to reuse results across runs.
#[derive(Debug, Default)]
pub struct DistanceOracle {
    cache: RwLock<HashMap<PairKey, f64>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl DistanceOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        let (ka, kb) = (a.key(), b.key());
        if ka == kb {
            return 0.0;
        }

        // Order the pair so (a, b) and (b, a) share one entry and one computation.
        let (key, first, second) = if ka <= kb { ((ka, kb), a, b) } else { ((kb, ka), b, a) };

        if let Some(&meters) = self.cache.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return meters;
        }

        let meters = Geodesic::distance(first.to_point(), second.to_point());
        self.misses.fetch_add(1, Ordering::Relaxed);
        // Another thread may have raced us here; it wrote the same value.
        *self.cache.write().entry(key).or_insert(meters)
    }

    pub fn cached_pairs(&self) -> usize {
        self.cache.read().len()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.cache.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }
}

impl DistanceSource for DistanceOracle {
    fn distance(&self, a: &Coordinate, b: &Coordinate) -> f64 {
        DistanceOracle::distance(self, a, b)
    }
}
