use std::ops::Range;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::VolumeError;

/// Splits `[start, end)` into at most `parts` contiguous, non-empty ranges.
///
/// Sizes differ by at most one; the first `len % parts` ranges get the extra element.
pub fn distribute_range(start: i32, end: i32, parts: usize) -> Vec<Range<i32>> {
    if parts == 0 || end <= start {
        return Vec::new();
    }
    let total = (end - start) as usize;
    let base = total / parts;
    let extra = total % parts;
    let mut out = Vec::with_capacity(parts.min(total));
    let mut cur = start;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        if len == 0 {
            break;
        }
        let next = cur + len as i32;
        out.push(cur..next);
        cur = next;
    }
    out
}

/// Lazily built rayon pool, kept for the last thread count asked for.
#[derive(Debug, Default)]
pub(crate) struct WorkerPool {
    cached: Mutex<Option<(usize, Arc<ThreadPool>)>>,
}

impl WorkerPool {
    fn get(&self, threads: usize) -> Result<Arc<ThreadPool>, VolumeError> {
        let mut cached = self.cached.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((n, pool)) = cached.as_ref() {
            if *n == threads {
                return Ok(pool.clone());
            }
        }
        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(threads)
                .thread_name(|i| format!("mcvolume-bulk-{i}"))
                .build()?,
        );
        log::debug!("built bulk worker pool with {threads} threads");
        *cached = Some((threads, pool.clone()));
        Ok(pool)
    }

    /// Runs every job to completion. One thread, or a single job, runs inline
    /// on the caller.
    pub(crate) fn run<J, F>(&self, threads: usize, jobs: Vec<J>, f: F) -> Result<(), VolumeError>
    where
        J: Send,
        F: Fn(J) + Sync,
    {
        if threads <= 1 || jobs.len() <= 1 {
            jobs.into_iter().for_each(f);
            return Ok(());
        }
        let pool = self.get(threads)?;
        let f = &f;
        pool.scope(|s| {
            for (i, job) in jobs.into_iter().enumerate() {
                s.spawn(move |_| {
                    let t0 = Instant::now();
                    f(job);
                    log::trace!("bulk job {i} done in {:?}", t0.elapsed());
                });
            }
        });
        Ok(())
    }
}
