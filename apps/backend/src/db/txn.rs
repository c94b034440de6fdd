use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, IsolationLevel,
    TransactionTrait,
};
use tracing::warn;

use super::txn_policy;
use crate::error::AppError;

/// Boxed future returned by a [`with_txn`] body; borrows the transaction.
pub type TxnFuture<'c, R> = Pin<Box<dyn Future<Output = Result<R, AppError>> + Send + 'c>>;

/// Execute a function within a database transaction.
///
/// Postgres transactions run SERIALIZABLE so that the candidate-card read and
/// the hand inserts of a deal cannot interleave with another deal. SQLite
/// pools hold a single connection, which serialises writers already.
///
/// On `Ok` the process [`txn_policy`] decides between commit and rollback;
/// on `Err` the transaction is rolled back and the original error returned.
/// The body must only touch the database through the transaction it is given.
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, AppError>
where
    R: Send,
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> TxnFuture<'c, R> + Send,
{
    let txn = match db.get_database_backend() {
        DatabaseBackend::Postgres => {
            db.begin_with_config(Some(IsolationLevel::Serializable), None)
                .await?
        }
        _ => db.begin().await?,
    };

    match f(&txn).await {
        Ok(val) => {
            match txn_policy::current() {
                txn_policy::TxnPolicy::CommitOnOk => txn.commit().await?,
                txn_policy::TxnPolicy::RollbackOnOk => txn.rollback().await?,
            }
            Ok(val)
        }
        Err(err) => {
            // best-effort rollback; keep the original error
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "rollback after failed transaction body failed");
            }
            Err(err)
        }
    }
}
