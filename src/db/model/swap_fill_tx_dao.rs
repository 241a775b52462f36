use super::{Direction, FillTxStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One attempt to settle a swap on the destination chain.
#[derive(Serialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SwapFillTxDao {
    pub id: i64,
    pub direction: Direction,
    pub start_swap_tx_hash: String,
    pub fill_swap_tx_hash: String,
    pub gas_price: String,
    pub height: i64,
    pub consumed_fee_amount: Option<String>,
    pub status: FillTxStatus,
    pub track_retry_counter: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
