use crate::db::model::*;
use sqlx::Executor;
use sqlx::Sqlite;

pub async fn insert_fill_tx<'c, E>(
    executor: E,
    fill_tx: &SwapFillTxDao,
) -> Result<SwapFillTxDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query_as::<_, SwapFillTxDao>(
        r"INSERT INTO swap_fill_tx
(direction, start_swap_tx_hash, fill_swap_tx_hash, gas_price, height, consumed_fee_amount, status, track_retry_counter, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *;
",
    )
    .bind(fill_tx.direction)
    .bind(&fill_tx.start_swap_tx_hash)
    .bind(&fill_tx.fill_swap_tx_hash)
    .bind(&fill_tx.gas_price)
    .bind(fill_tx.height)
    .bind(&fill_tx.consumed_fee_amount)
    .bind(fill_tx.status)
    .bind(fill_tx.track_retry_counter)
    .bind(fill_tx.created_at)
    .bind(fill_tx.updated_at)
    .fetch_one(executor)
    .await?;
    Ok(res)
}

/// The single fill attempt that may still settle on chain. Failed and
/// Missing attempts left behind by earlier retries are not in flight.
pub async fn get_in_flight_fill_tx<'c, E>(
    executor: E,
    start_swap_tx_hash: &str,
) -> Result<Option<SwapFillTxDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SwapFillTxDao>(
        r"SELECT * FROM swap_fill_tx
WHERE start_swap_tx_hash = $1 AND status IN ($2, $3)
ORDER BY id DESC LIMIT 1",
    )
    .bind(start_swap_tx_hash)
    .bind(FillTxStatus::Created)
    .bind(FillTxStatus::Sent)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}

pub async fn get_fill_txs_by_start_tx_hash<'c, E>(
    executor: E,
    start_swap_tx_hash: &str,
) -> Result<Vec<SwapFillTxDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapFillTxDao>(
        r"SELECT * FROM swap_fill_tx WHERE start_swap_tx_hash = $1 ORDER BY id ASC",
    )
    .bind(start_swap_tx_hash)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn update_fill_tx_status<'c, E>(
    executor: E,
    fill_tx_id: i64,
    status: FillTxStatus,
) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(r"UPDATE swap_fill_tx SET status = $2, updated_at = $3 WHERE id = $1")
        .bind(fill_tx_id)
        .bind(status)
        .bind(chrono::Utc::now())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn delete_fill_tx<'c, E>(executor: E, fill_tx_id: i64) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(r"DELETE FROM swap_fill_tx WHERE id = $1")
        .bind(fill_tx_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Sent fill txs whose status stayed uncertain past the per-chain poll budget.
pub async fn get_reapable_fill_txs<'c, E>(
    executor: E,
    directions: [Direction; 2],
    max_track_retry: i64,
    limit: i64,
) -> Result<Vec<SwapFillTxDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapFillTxDao>(
        r"SELECT * FROM swap_fill_tx
WHERE status = $1 AND direction IN ($2, $3) AND track_retry_counter >= $4
ORDER BY id ASC LIMIT $5",
    )
    .bind(FillTxStatus::Sent)
    .bind(directions[0])
    .bind(directions[1])
    .bind(max_track_retry)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn get_trackable_fill_txs<'c, E>(
    executor: E,
    directions: [Direction; 2],
    max_track_retry: i64,
    limit: i64,
) -> Result<Vec<SwapFillTxDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapFillTxDao>(
        r"SELECT * FROM swap_fill_tx
WHERE status = $1 AND direction IN ($2, $3) AND track_retry_counter < $4
ORDER BY id ASC LIMIT $5",
    )
    .bind(FillTxStatus::Sent)
    .bind(directions[0])
    .bind(directions[1])
    .bind(max_track_retry)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn bump_track_retry_counter<'c, E>(
    executor: E,
    fill_tx_id: i64,
) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r"UPDATE swap_fill_tx
SET track_retry_counter = track_retry_counter + 1, updated_at = $2
WHERE id = $1",
    )
    .bind(fill_tx_id)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn finalize_fill_tx<'c, E>(
    executor: E,
    fill_tx_id: i64,
    status: FillTxStatus,
    height: i64,
    consumed_fee_amount: &str,
) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r"UPDATE swap_fill_tx
SET status = $2, height = $3, consumed_fee_amount = $4, updated_at = $5
WHERE id = $1",
    )
    .bind(fill_tx_id)
    .bind(status)
    .bind(height)
    .bind(consumed_fee_amount)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}
