use std::future::Future;

use crate::NikromeError;

/// Drive a future to completion on a fresh current-thread tokio runtime.
///
/// Used by the CLI and by the UI background threads; the UI thread itself
/// never blocks on network calls.
pub fn block_on<F: Future>(future: F) -> Result<F::Output, NikromeError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NikromeError::RuntimeError { source: e })?;
    Ok(runtime.block_on(future))
}

/// [`block_on`] for fallible futures, folding a runtime start failure and
/// the future's own error into one result
pub fn try_block_on<F, T>(future: F) -> Result<T, NikromeError>
where
    F: Future<Output = Result<T, NikromeError>>,
{
    block_on(future)?
}
