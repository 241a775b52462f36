use chrono::{DateTime, Utc};
use serde::Serialize;

/// Persisted swap-pair definition, hydrated into the in-memory registry at
/// boot. Inserted and toggled by the admin surface.
#[derive(Serialize, sqlx::FromRow, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SwapPairDao {
    pub id: i64,
    pub symbol: String,
    pub name: String,
    pub decimals: i64,
    pub src_token_addr: String,
    pub dst_token_addr: String,
    pub low_bound: String,
    pub upper_bound: String,
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
