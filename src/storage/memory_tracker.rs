use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{DynVecError, Result};

/// Byte budget for one memory domain, shared by every buffer allocated in it.
///
/// Reserve-then-check: the counter is bumped first and rolled back if the
/// result exceeds the budget.
pub struct MemoryTracker {
    budget: u64,
    used: AtomicU64,
}

impl MemoryTracker {
    pub const fn new(budget: u64) -> Self {
        Self {
            budget,
            used: AtomicU64::new(0),
        }
    }

    pub fn allocate(&self, size: u64) -> Result<()> {
        let prev = self.used.fetch_add(size, Ordering::Release);
        let new = match prev.checked_add(size) {
            Some(v) => v,
            None => {
                self.used.fetch_sub(size, Ordering::Release);
                return Err(DynVecError::OutOfMemory(format!(
                    "allocation of {} bytes overflows the byte counter",
                    size
                )));
            }
        };

        if new > self.budget {
            self.used.fetch_sub(size, Ordering::Release);
            return Err(DynVecError::OutOfMemory(format!(
                "tried to allocate {} bytes with {} of {} bytes already in use",
                size, prev, self.budget
            )));
        }

        Ok(())
    }

    pub fn deallocate(&self, size: u64) {
        self.used.fetch_sub(size, Ordering::Release);
    }

    pub fn used(&self) -> u64 {
        self.used.load(Ordering::Acquire)
    }

    pub fn available(&self) -> u64 {
        // a rejected allocation briefly overshoots `used` before rolling
        // back, so the subtraction must tolerate used > budget
        self.budget.saturating_sub(self.used())
    }

    pub fn budget(&self) -> u64 {
        self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_allocations_against_budget() {
        let tracker = MemoryTracker::new(100);
        tracker.allocate(60).unwrap();
        assert_eq!(tracker.used(), 60);
        assert_eq!(tracker.available(), 40);

        assert!(matches!(
            tracker.allocate(50),
            Err(DynVecError::OutOfMemory(_))
        ));
        // a failed allocation must not leak into the counter
        assert_eq!(tracker.used(), 60);

        tracker.deallocate(60);
        assert_eq!(tracker.used(), 0);
        tracker.allocate(100).unwrap();
    }

    #[test]
    fn available_never_underflows_under_contention() {
        use std::sync::Arc;

        let tracker = Arc::new(MemoryTracker::new(100));
        let mut workers = Vec::new();
        for _ in 0..4 {
            let tracker = Arc::clone(&tracker);
            workers.push(std::thread::spawn(move || {
                for _ in 0..1000 {
                    let _ = tracker.allocate(1_000);
                }
            }));
        }

        // must not panic even while over-budget requests are mid-rollback
        for _ in 0..10_000 {
            let _ = tracker.available();
        }

        for worker in workers {
            worker.join().unwrap();
        }
        assert_eq!(tracker.available(), 100);
    }
}
