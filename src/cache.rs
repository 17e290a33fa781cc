use crate::basis::{coefficient_matrix, BasisError};
use crate::config::ModelConfig;
use linked_hash_map::LinkedHashMap;
use ndarray::Array2;
use std::sync::{Arc, OnceLock, RwLock, RwLockWriteGuard};

/// Bounded least-recently-used cache of harmonic design matrices.
///
/// Entries are keyed by the exact ordered date sequence ONLY. The key
/// deliberately excludes `num_coeffs` and `avg_days_yr`: two calls with the
/// same dates but different coefficient counts share one entry, and whichever
/// ran first wins. This reproduces the caching behavior the segmentation
/// driver was built against; callers that mix coefficient counts over the
/// same date window must use separate caches. See
/// `stale_entry_is_served_for_different_num_coeffs` in the tests, which pins
/// the caveat.
///
/// Matrices are handed out as `Arc` clones, so eviction never invalidates a
/// matrix a caller already holds. Lookups take the write lock because a hit
/// reorders the entry to most-recently-used.
pub struct BasisCache {
    entries: RwLock<LinkedHashMap<Vec<i64>, Arc<Array2<f64>>>>,
    capacity: usize,
}

impl BasisCache {
    /// Create a cache holding at most `capacity` design matrices.
    pub fn new(capacity: usize) -> Result<Self, BasisError> {
        if capacity == 0 {
            return Err(BasisError::ZeroCacheCapacity);
        }
        Ok(Self {
            entries: RwLock::new(LinkedHashMap::new()),
            capacity,
        })
    }

    /// Return the design matrix for `dates`, building and inserting it on a
    /// miss.
    ///
    /// Concurrent misses on the same key may both build the matrix; the last
    /// writer wins and both results are identical for identical inputs, so
    /// the race only wastes work. The matrix is built outside the lock.
    pub fn coefficients(
        &self,
        dates: &[i64],
        num_coeffs: usize,
        avg_days_yr: f64,
    ) -> Result<Arc<Array2<f64>>, BasisError> {
        {
            let mut entries = self.write_entries();
            if let Some(matrix) = entries.get_refresh(dates) {
                return Ok(Arc::clone(matrix));
            }
        }

        let matrix = Arc::new(coefficient_matrix(dates, num_coeffs, avg_days_yr)?);

        let mut entries = self.write_entries();
        if entries.get_refresh(dates).is_none() && entries.len() >= self.capacity {
            if let Some((evicted, _)) = entries.pop_front() {
                log::debug!(
                    "basis cache full; evicting LRU entry with {} dates",
                    evicted.len()
                );
            }
        }
        entries.insert(dates.to_vec(), Arc::clone(&matrix));
        Ok(matrix)
    }

    /// Number of cached matrices.
    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached entry. Matrices already handed out stay valid.
    pub fn clear(&self) {
        self.write_entries().clear();
    }

    fn write_entries(&self) -> RwLockWriteGuard<'_, LinkedHashMap<Vec<i64>, Arc<Array2<f64>>>> {
        // A poisoned lock means a panic elsewhere mid-operation; the map
        // itself is still structurally valid, so recover rather than spread
        // the panic through every fitting call.
        match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Process-wide cache used by the convenience fitting entry points. Created
/// on first use with the default capacity and never torn down.
pub fn shared_cache() -> &'static BasisCache {
    static CACHE: OnceLock<BasisCache> = OnceLock::new();
    CACHE.get_or_init(|| BasisCache {
        entries: RwLock::new(LinkedHashMap::new()),
        capacity: ModelConfig::default().coefficient_cache_size,
    })
}
