mod fill_tx_ops;
mod pair_ops;
mod start_log_ops;
mod swap_ops;

pub use fill_tx_ops::*;
pub use pair_ops::*;
pub use start_log_ops::*;
pub use swap_ops::*;

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation)
        }
        _ => false,
    }
}
