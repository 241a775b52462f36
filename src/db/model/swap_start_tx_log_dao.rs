use super::{Chain, TxLogPhase, TxLogStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw lock event observed on a source chain, produced by the external log
/// scraper. Never deleted; only its phase advances.
#[derive(Serialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SwapStartTxLogDao {
    pub id: i64,
    pub tx_hash: String,
    pub chain: Chain,
    pub token_addr: String,
    pub from_address: String,
    pub amount: String,
    pub to_chain_id: String,
    pub height: i64,
    pub status: TxLogStatus,
    pub phase: TxLogPhase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
