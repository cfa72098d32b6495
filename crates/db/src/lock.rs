//! Lock conflict detection and retry for bank balance writes.
//!
//! A conflict is a deadlock, a lock wait timeout, or a serialization
//! failure. These are expected when several postings hit the same bank
//! account and are the only errors worth retrying.

use std::future::Future;

use sea_orm::{DbErr, RuntimeErr};
use tracing::warn;

use ledgersync_core::treasury::{BankError, RetryPolicy, with_retry};

/// PostgreSQL SQLSTATEs plus SQLite `BUSY`, `LOCKED` and `BUSY_RECOVERY`.
const LOCK_CONFLICT_CODES: &[&str] = &["40P01", "55P03", "40001", "5", "6", "517"];

/// Driver messages seen when no code is available.
const LOCK_CONFLICT_MESSAGES: &[&str] = &[
    "deadlock detected",
    "lock timeout",
    "could not obtain lock",
    "could not serialize access",
    "database is locked",
    "database table is locked",
];

/// Returns true if the error is a deadlock, lock timeout or serialization failure.
pub fn is_lock_conflict(err: &DbErr) -> bool {
    let runtime = match err {
        DbErr::Conn(e) | DbErr::Exec(e) | DbErr::Query(e) => e,
        _ => return false,
    };

    if let RuntimeErr::SqlxError(sqlx_err) = runtime
        && let Some(code) = sqlx_err.as_database_error().and_then(|e| e.code())
        && LOCK_CONFLICT_CODES.contains(&code.as_ref())
    {
        return true;
    }

    let message = runtime.to_string().to_lowercase();
    LOCK_CONFLICT_MESSAGES.iter().any(|m| message.contains(m))
}

/// Maps a database error into the bank ledger taxonomy.
pub fn bank_db_error(err: DbErr) -> BankError {
    if is_lock_conflict(&err) {
        BankError::LockConflict(err.to_string())
    } else {
        BankError::Database(err.to_string())
    }
}

/// Runs one transactional unit with the bank ledger retry policy.
///
/// `operation` must open its own transaction or savepoint on every call.
///
/// # Errors
///
/// Returns the operation's error, or `BankError::ConcurrencyExhausted`
/// once lock conflicts outlast the policy.
pub async fn retry_on_lock_conflict<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, BankError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, BankError>>,
{
    with_retry(policy, BankError::is_retryable, |attempt| {
        if attempt > 1 {
            warn!(
                operation = operation_name,
                attempt,
                max_attempts = policy.attempts(),
                "Retrying bank ledger write after lock conflict"
            );
        }
        operation()
    })
    .await
    .map_err(BankError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn exec_error(message: &str) -> DbErr {
        DbErr::Exec(RuntimeErr::Internal(message.to_string()))
    }

    #[test]
    fn test_conflict_messages() {
        assert!(is_lock_conflict(&exec_error("ERROR: deadlock detected")));
        assert!(is_lock_conflict(&DbErr::Query(RuntimeErr::Internal(
            "database is locked".to_string()
        ))));
        assert!(is_lock_conflict(&exec_error(
            "could not serialize access due to concurrent update"
        )));
    }

    #[test]
    fn test_other_errors_are_not_conflicts() {
        assert!(!is_lock_conflict(&exec_error("duplicate key value")));
        assert!(!is_lock_conflict(&DbErr::RecordNotFound("row".to_string())));
        assert!(!is_lock_conflict(&DbErr::Custom("deadlock detected".to_string())));
    }

    #[test]
    fn test_bank_db_error_classification() {
        assert!(matches!(
            bank_db_error(exec_error("deadlock detected")),
            BankError::LockConflict(_)
        ));
        assert!(matches!(
            bank_db_error(exec_error("relation does not exist")),
            BankError::Database(_)
        ));
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, 0, 0);

        let result = retry_on_lock_conflict(&policy, "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(bank_db_error(exec_error("deadlock detected")))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, 0, 0);

        let result: Result<(), BankError> = retry_on_lock_conflict(&policy, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(BankError::LockConflict("lock timeout".to_string()))
        })
        .await;

        assert!(matches!(result, Err(BankError::ConcurrencyExhausted { attempts: 3 })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_conflict_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, 0, 0);

        let result: Result<(), BankError> = retry_on_lock_conflict(&policy, "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(BankError::VoidReasonRequired)
        })
        .await;

        assert!(matches!(result, Err(BankError::VoidReasonRequired)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
