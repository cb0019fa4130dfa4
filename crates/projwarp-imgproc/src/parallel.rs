use rayon::prelude::*;
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),

    /// The row stride must be valid.
    #[error("row stride must be > 0 and divide the buffer length, got {0}")]
    InvalidRowStride(usize),
}

/// Controls how row-wise operations are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Use the global Rayon thread pool to process rows in parallel.
    #[default]
    ParallelRows,

    /// Run sequentially on the current thread.
    ///
    /// Useful for small images, debugging, or when the overhead of parallelization
    /// outweighs the benefits.
    Serial,

    /// Run on a local thread pool with `n` threads.
    ///
    /// # Warning
    /// Creates a new thread pool on every call, which has significant overhead.
    /// Use this primarily for benchmarking or specific isolation needs.
    Fixed(usize),
}

/// Apply `f(row_index, row)` to every row of a row-major buffer.
///
/// Each row is handed to exactly one invocation of `f`, so writes never overlap.
///
/// # Arguments
///
/// * `dst` - The flat row-major buffer.
/// * `cols` - The number of elements per row.
/// * `strategy` - The execution strategy.
/// * `f` - The operation to perform on each row.
pub fn par_iter_rows_mut<T, F>(
    dst: &mut [T],
    cols: usize,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send,
    F: Fn(usize, &mut [T]) + Send + Sync,
{
    if cols == 0 || dst.len() % cols != 0 {
        return Err(ParallelError::InvalidRowStride(cols));
    }

    match strategy {
        ExecutionStrategy::Serial => {
            dst.chunks_exact_mut(cols)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::ParallelRows => {
            dst.par_chunks_exact_mut(cols)
                .enumerate()
                .for_each(|(y, row)| f(y, row));
        }
        ExecutionStrategy::Fixed(n) => {
            if n == 0 {
                return Err(ParallelError::InvalidThreadCount(n));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| ParallelError::BuildError(e.to_string()))?;

            pool.install(|| {
                dst.par_chunks_exact_mut(cols)
                    .enumerate()
                    .for_each(|(y, row)| f(y, row));
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_rows(strategy: ExecutionStrategy) -> Result<Vec<usize>, ParallelError> {
        let mut dst = vec![0usize; 6];
        par_iter_rows_mut(&mut dst, 2, strategy, |y, row| {
            for (x, v) in row.iter_mut().enumerate() {
                *v = y * 10 + x;
            }
        })?;
        Ok(dst)
    }

    #[test]
    fn test_rows_all_strategies() -> Result<(), ParallelError> {
        let expected = vec![0, 1, 10, 11, 20, 21];
        assert_eq!(fill_rows(ExecutionStrategy::Serial)?, expected);
        assert_eq!(fill_rows(ExecutionStrategy::ParallelRows)?, expected);
        assert_eq!(fill_rows(ExecutionStrategy::Fixed(2))?, expected);
        Ok(())
    }

    #[test]
    fn test_rows_invalid_stride() {
        let mut dst = vec![0u8; 5];
        let res = par_iter_rows_mut(&mut dst, 2, ExecutionStrategy::Serial, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidRowStride(2)));

        let res = par_iter_rows_mut(&mut dst, 0, ExecutionStrategy::Serial, |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidRowStride(0)));
    }

    #[test]
    fn test_fixed_zero_threads() {
        let mut dst = vec![0u8; 4];
        let res = par_iter_rows_mut(&mut dst, 2, ExecutionStrategy::Fixed(0), |_, _| {});
        assert_eq!(res, Err(ParallelError::InvalidThreadCount(0)));
    }
}
