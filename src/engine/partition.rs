//! Row partitioning across scoped worker threads.
//!
//! Rows `[0, rows)` are split into contiguous partitions of `rows / workers`
//! rows; the last partition absorbs the remainder. Each worker owns a
//! disjoint `&mut` slice of the output and returns its local extremes, which
//! are reduced after every worker has been joined.

use crate::engine::convolve::{convolve_rows, RawRange};
use crate::engine::normalize::RawField;
use crate::engine::BorderPolicy;
use crate::image::Layer;
use crate::kernel::Kernel;
use crate::trace::{filter_debug, filter_event, filter_span};
use crate::util::{FilterError, FilterResult};
use std::num::NonZeroUsize;
use std::ops::Range;
use std::thread;

/// Hardware concurrency, falling back to a single worker.
pub fn available_workers() -> NonZeroUsize {
    thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Splits `[0, rows)` into at most `workers` contiguous ranges.
///
/// The worker count is capped at `rows` so no partition is empty.
pub fn partition_rows(rows: usize, workers: NonZeroUsize) -> Vec<Range<usize>> {
    if rows == 0 {
        return Vec::new();
    }
    let count = workers.get().min(rows);
    let per_worker = rows / count;
    (0..count)
        .map(|t| {
            let start = t * per_worker;
            let end = if t == count - 1 { rows } else { start + per_worker };
            start..end
        })
        .collect()
}

/// Computes the raw field of `src` on up to `workers` threads.
pub(crate) fn convolve_partitioned(
    src: &Layer,
    kernel: &Kernel,
    border: BorderPolicy,
    workers: NonZeroUsize,
) -> FilterResult<RawField> {
    let (rows, cols) = src.dims();
    let ranges = partition_rows(rows, workers);
    let _span = filter_span!("convolve_partitioned").entered();
    filter_event!("partition_plan", rows = rows, workers = ranges.len());

    let mut out = vec![0.0f32; rows * cols];
    let range = fan_out(&ranges, cols, &mut out, |first_row, chunk| {
        convolve_rows(src, kernel, border, first_row, chunk)
    })?;
    Ok(RawField::from_parts(out, rows, cols, range))
}

/// Runs `work` once per row range on its own scoped thread.
///
/// Each call receives the first row of its range and the matching rows of
/// `out`. Every thread is joined before the first panicked partition, if any,
/// is reported.
pub(crate) fn fan_out<F>(
    ranges: &[Range<usize>],
    cols: usize,
    out: &mut [f32],
    work: F,
) -> FilterResult<RawRange>
where
    F: Fn(usize, &mut [f32]) -> RawRange + Sync,
{
    let work = &work;
    let joined: Vec<thread::Result<RawRange>> = thread::scope(|scope| {
        let mut rest: &mut [f32] = out;
        let mut handles = Vec::with_capacity(ranges.len());
        for range in ranges {
            let (chunk, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * cols);
            rest = tail;
            let first_row = range.start;
            handles.push(scope.spawn(move || work(first_row, chunk)));
        }
        handles.into_iter().map(|handle| handle.join()).collect()
    });

    let mut range = RawRange::EMPTY;
    for (partition, result) in joined.into_iter().enumerate() {
        let local = result.map_err(|_| FilterError::WorkerPanicked { partition })?;
        filter_debug!(
            "partition_range",
            partition = partition,
            min = local.min,
            max = local.max,
        );
        range = range.merge(local);
    }
    Ok(range)
}
