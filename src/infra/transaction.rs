//! Transaction boundary shared by reads, immediate writes and flushes.

use futures::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait};

use crate::errors::{AppError, AppResult};

/// Run `f` inside exactly one transaction.
///
/// Commits when `f` succeeds. On any error the transaction is rolled back
/// and the error is returned as produced by `f`; validation failures are
/// already aggregated by the time they get here. No transaction is left
/// open on return. Not reentrant: `f` must use the transaction it is given.
pub async fn within_transaction<F, T>(
    db: &DatabaseConnection,
    isolation: Option<IsolationLevel>,
    operation: &'static str,
    f: F,
) -> AppResult<T>
where
    F: for<'a> FnOnce(&'a DatabaseTransaction) -> BoxFuture<'a, AppResult<T>> + Send,
    T: Send,
{
    let txn = db.begin_with_config(isolation, None).await?;

    let outcome = f(&txn).await;

    match outcome {
        Ok(value) => {
            txn.commit().await?;
            tracing::debug!(operation, "Transaction committed");
            Ok(value)
        }
        Err(err) => {
            if let AppError::Validation(failure) = &err {
                tracing::warn!(operation, "Rolling back after validation failure: {}", failure);
            } else {
                tracing::debug!(operation, "Rolling back after error: {}", err);
            }

            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(err)
        }
    }
}
