use crate::db::model::*;
use sqlx::Executor;
use sqlx::Sqlite;

pub async fn insert_swap<'c, E>(executor: E, swap: &SwapDao) -> Result<SwapDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query_as::<_, SwapDao>(
        r"INSERT INTO swap
(status, sponsor, src_token_addr, dst_token_addr, symbol, amount, decimals, direction, start_tx_hash, fill_tx_hash, to_chain_id, log, record_hash, retry_count, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) RETURNING *;
",
    )
    .bind(swap.status)
    .bind(&swap.sponsor)
    .bind(&swap.src_token_addr)
    .bind(&swap.dst_token_addr)
    .bind(&swap.symbol)
    .bind(&swap.amount)
    .bind(swap.decimals)
    .bind(swap.direction)
    .bind(&swap.start_tx_hash)
    .bind(&swap.fill_tx_hash)
    .bind(&swap.to_chain_id)
    .bind(&swap.log)
    .bind(&swap.record_hash)
    .bind(swap.retry_count)
    .bind(swap.created_at)
    .bind(swap.updated_at)
    .fetch_one(executor)
    .await?;
    Ok(res)
}

pub async fn update_swap<'c, E>(executor: E, swap: &SwapDao) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(
        r"UPDATE swap SET
status = $2,
sponsor = $3,
src_token_addr = $4,
dst_token_addr = $5,
symbol = $6,
amount = $7,
decimals = $8,
direction = $9,
start_tx_hash = $10,
fill_tx_hash = $11,
to_chain_id = $12,
log = $13,
record_hash = $14,
retry_count = $15,
updated_at = $16
WHERE id = $1
",
    )
    .bind(swap.id)
    .bind(swap.status)
    .bind(&swap.sponsor)
    .bind(&swap.src_token_addr)
    .bind(&swap.dst_token_addr)
    .bind(&swap.symbol)
    .bind(&swap.amount)
    .bind(swap.decimals)
    .bind(swap.direction)
    .bind(&swap.start_tx_hash)
    .bind(&swap.fill_tx_hash)
    .bind(&swap.to_chain_id)
    .bind(&swap.log)
    .bind(&swap.record_hash)
    .bind(swap.retry_count)
    .bind(chrono::Utc::now())
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn get_swap_by_start_tx_hash<'c, E>(
    executor: E,
    start_tx_hash: &str,
) -> Result<Option<SwapDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SwapDao>(r"SELECT * FROM swap WHERE start_tx_hash = $1")
        .bind(start_tx_hash)
        .fetch_optional(executor)
        .await?;
    Ok(row)
}

/// Swaps a filler for the given destination directions may pick up:
/// freshly confirmed ones plus Sending leftovers from a previous run.
pub async fn get_fillable_swaps<'c, E>(
    executor: E,
    directions: [Direction; 2],
    limit: i64,
) -> Result<Vec<SwapDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapDao>(
        r"SELECT * FROM swap
WHERE status IN ($1, $2) AND direction IN ($3, $4)
ORDER BY id ASC LIMIT $5",
    )
    .bind(SwapStatus::Confirmed)
    .bind(SwapStatus::Sending)
    .bind(directions[0])
    .bind(directions[1])
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn get_retryable_swaps<'c, E>(
    executor: E,
    max_retry: i64,
    limit: i64,
) -> Result<Vec<SwapDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapDao>(
        r"SELECT * FROM swap
WHERE status = $1 AND retry_count < $2
ORDER BY id ASC LIMIT $3",
    )
    .bind(SwapStatus::SendFailed)
    .bind(max_retry)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}
