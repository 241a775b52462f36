use crate::db::model::*;
use sqlx::Executor;
use sqlx::Sqlite;

pub async fn insert_start_tx_log<'c, E>(
    executor: E,
    log: &SwapStartTxLogDao,
) -> Result<SwapStartTxLogDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query_as::<_, SwapStartTxLogDao>(
        r"INSERT INTO swap_start_tx_log
(tx_hash, chain, token_addr, from_address, amount, to_chain_id, height, status, phase, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *;
",
    )
    .bind(&log.tx_hash)
    .bind(log.chain)
    .bind(&log.token_addr)
    .bind(&log.from_address)
    .bind(&log.amount)
    .bind(&log.to_chain_id)
    .bind(log.height)
    .bind(log.status)
    .bind(log.phase)
    .bind(log.created_at)
    .bind(log.updated_at)
    .fetch_one(executor)
    .await?;
    Ok(res)
}

pub async fn get_logs_in_phase<'c, E>(
    executor: E,
    phase: TxLogPhase,
    limit: i64,
) -> Result<Vec<SwapStartTxLogDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapStartTxLogDao>(
        r"SELECT * FROM swap_start_tx_log WHERE phase = $1 ORDER BY height ASC LIMIT $2",
    )
    .bind(phase)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn get_confirmed_logs_in_phase<'c, E>(
    executor: E,
    phase: TxLogPhase,
    limit: i64,
) -> Result<Vec<SwapStartTxLogDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, SwapStartTxLogDao>(
        r"SELECT * FROM swap_start_tx_log WHERE status = $1 AND phase = $2 ORDER BY height ASC LIMIT $3",
    )
    .bind(TxLogStatus::Confirmed)
    .bind(phase)
    .bind(limit)
    .fetch_all(executor)
    .await?;
    Ok(rows)
}

pub async fn advance_log_phase<'c, E>(
    executor: E,
    log_id: i64,
    phase: TxLogPhase,
) -> Result<(), sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    sqlx::query(r"UPDATE swap_start_tx_log SET phase = $2, updated_at = $3 WHERE id = $1")
        .bind(log_id)
        .bind(phase)
        .bind(chrono::Utc::now())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn get_start_tx_log<'c, E>(
    executor: E,
    tx_hash: &str,
) -> Result<Option<SwapStartTxLogDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, SwapStartTxLogDao>(
        r"SELECT * FROM swap_start_tx_log WHERE tx_hash = $1",
    )
    .bind(tx_hash)
    .fetch_optional(executor)
    .await?;
    Ok(row)
}
