use super::{Direction, SwapStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One logical bridge operation. Every mutation happens inside a DB
/// transaction that also rewrites `record_hash`.
#[derive(Serialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SwapDao {
    pub id: i64,
    pub status: SwapStatus,
    pub sponsor: String,
    pub src_token_addr: String,
    pub dst_token_addr: String,
    pub symbol: String,
    pub amount: String,
    pub decimals: i64,
    pub direction: Direction,
    pub start_tx_hash: String,
    pub fill_tx_hash: String,
    pub to_chain_id: String,
    pub log: String,
    #[serde(skip_serializing)]
    pub record_hash: String,
    pub retry_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
