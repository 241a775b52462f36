use crate::db::model::*;
use sqlx::Executor;
use sqlx::Sqlite;

pub async fn insert_swap_pair<'c, E>(
    executor: E,
    pair: &SwapPairDao,
) -> Result<SwapPairDao, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let res = sqlx::query_as::<_, SwapPairDao>(
        r"INSERT INTO swap_pair
(symbol, name, decimals, src_token_addr, dst_token_addr, low_bound, upper_bound, available, created_at, updated_at)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) RETURNING *;
",
    )
    .bind(&pair.symbol)
    .bind(&pair.name)
    .bind(pair.decimals)
    .bind(&pair.src_token_addr)
    .bind(&pair.dst_token_addr)
    .bind(&pair.low_bound)
    .bind(&pair.upper_bound)
    .bind(pair.available)
    .bind(pair.created_at)
    .bind(pair.updated_at)
    .fetch_one(executor)
    .await?;
    Ok(res)
}

pub async fn get_available_swap_pairs<'c, E>(executor: E) -> Result<Vec<SwapPairDao>, sqlx::Error>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows =
        sqlx::query_as::<_, SwapPairDao>(r"SELECT * FROM swap_pair WHERE available = TRUE")
            .fetch_all(executor)
            .await?;
    Ok(rows)
}
