//! Async runtime utilities for Tessera.
//!
//! Provides runtime construction for the worker pool and a blocking bridge
//! for synchronous callers.

use std::future::Future;

use common_error::{TesseraError, TesseraResult};
use tokio::runtime::{Builder, Runtime};

/// Create a single-threaded runtime for blocking operations.
pub fn get_runtime() -> TesseraResult<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| TesseraError::InternalError(format!("Failed to create runtime: {e}")))
}

/// Block on a future using a fresh single-threaded runtime.
///
/// Must not be called from within an async context.
pub fn block_on<F: Future>(future: F) -> TesseraResult<F::Output> {
    let runtime = get_runtime()?;
    Ok(runtime.block_on(future))
}

/// Create a multi-threaded worker pool.
///
/// `num_workers` of `None` (or zero) uses the number of available cores.
pub fn worker_runtime(num_workers: Option<usize>) -> TesseraResult<Runtime> {
    let threads = num_workers.filter(|n| *n > 0).unwrap_or_else(num_cpus);
    Builder::new_multi_thread()
        .worker_threads(threads)
        .thread_name("tessera-worker")
        .enable_all()
        .build()
        .map_err(|e| TesseraError::InternalError(format!("Failed to create worker pool: {e}")))
}

/// Number of available cores, at least one.
pub fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZero::get)
        .unwrap_or(1)
}
