//! Bounded fan-out over independent read-only git queries.
//!
//! Diff collection and dry-merge trials are independent per branch / pair,
//! so they run on a small pool of scoped threads. Each result lands in the
//! slot matching its input index, so output order never depends on which
//! worker finished first.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Default number of concurrent workers.
pub const DEFAULT_JOBS: usize = 8;

/// Apply `f` to every item using at most `jobs` threads.
///
/// Returns results in input order. If any call fails, the error with the
/// lowest input index among those that ran is returned, workers stop picking
/// up new items, and no partial output is produced.
///
/// `jobs` of 0 is treated as 1. With one job (or at most one item) the work
/// runs inline on the calling thread.
///
/// # Errors
/// Propagates the first (by index) error returned by `f`.
pub fn fan_out<T, R, E, F>(items: &[T], jobs: usize, f: F) -> Result<Vec<R>, E>
where
    T: Sync,
    R: Send,
    E: Send,
    F: Fn(&T) -> Result<R, E> + Sync,
{
    let workers = jobs.max(1).min(items.len());
    if workers <= 1 {
        return items.iter().map(&f).collect();
    }

    let slots: Vec<Mutex<Option<Result<R, E>>>> =
        items.iter().map(|_| Mutex::new(None)).collect();
    let cursor = AtomicUsize::new(0);
    let failed = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| {
                loop {
                    if failed.load(Ordering::Acquire) {
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::AcqRel);
                    let Some(item) = items.get(index) else {
                        break;
                    };
                    let result = f(item);
                    if result.is_err() {
                        failed.store(true, Ordering::Release);
                    }
                    if let Ok(mut slot) = slots[index].lock() {
                        *slot = Some(result);
                    }
                }
            });
        }
    });

    let mut results = Vec::with_capacity(items.len());
    let mut first_err = None;
    for slot in slots {
        let value = slot
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match value {
            Some(Ok(r)) => results.push(r),
            Some(Err(e)) => {
                first_err = Some(e);
                break;
            }
            // Skipped after an earlier failure; a later slot holds the error.
            None => {}
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(results),
    }
}
