use futures_util::future::BoxFuture;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use tracing::warn;

use super::require_db;
use crate::error::AppError;
use crate::state::AppState;

/// Run `f` inside a transaction: commit on `Ok`, roll back on `Err`.
///
/// The closure receives the transaction by reference; move owned values into
/// the returned future.
pub async fn with_txn<R, F>(state: &AppState, f: F) -> Result<R, AppError>
where
    R: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, AppError>>,
{
    let txn = require_db(state)?.begin().await?;

    match f(&txn).await {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback failed after handler error");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::infra::state::build_state;

    #[tokio::test]
    async fn commits_on_ok() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = build_state().with_connection(db).build().await.unwrap();

        let out = with_txn(&state, |_txn| Box::pin(async { Ok(7) })).await.unwrap();
        assert_eq!(out, 7);
    }

    #[tokio::test]
    async fn propagates_err() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let state = build_state().with_connection(db).build().await.unwrap();

        let out: Result<(), AppError> =
            with_txn(&state, |_txn| Box::pin(async { Err(AppError::bad_request("nope")) })).await;
        assert!(matches!(out, Err(AppError::BadRequest { .. })));
    }
}
