//! Bounded retry for structural mutations that lose a race.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use drivebox_core::result::AppResult;

/// Maximum attempts per structural mutation.
const MAX_ATTEMPTS: u32 = 3;

/// Backoff before the first retry; doubles per attempt.
const BASE_BACKOFF: Duration = Duration::from_millis(20);

/// Run `f`, retrying on `TransactionConflict` with exponential backoff.
///
/// Only conflicts are retried; every other error surfaces immediately.
pub(crate) async fn with_conflict_retry<T, F, Fut>(operation: &'static str, mut f: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0u32;
    loop {
        match f().await {
            Err(e) if e.is_retryable() && attempt + 1 < MAX_ATTEMPTS => {
                attempt += 1;
                warn!(operation, attempt, "Transaction conflict; retrying");
                tokio::time::sleep(BASE_BACKOFF * 2u32.pow(attempt - 1)).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drivebox_core::error::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_succeeds_after_transient_conflicts() {
        let calls = AtomicU32::new(0);
        let result = with_conflict_retry("test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::transaction_conflict("lost the race"))
            } else {
                Ok(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_conflict_retry("test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::transaction_conflict("still losing"))
        })
        .await;
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_non_conflicts_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_conflict_retry("test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::not_found("gone"))
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
