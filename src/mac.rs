use crate::db::model::SwapDao;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Version tag mixed into the MAC input. Bump when the covered field set
/// changes; existing rows then fail verification instead of silently
/// authenticating under a different schema.
const MAC_SCHEMA_VERSION: &str = "1";

/// Keyed MAC binding a persisted swap record to the engine secret.
/// Writers seal rows inside the transaction that persists them; readers
/// verify before acting on a row.
pub struct SwapRecordMac {
    key: Vec<u8>,
}

impl SwapRecordMac {
    pub fn new(key: &str) -> Self {
        SwapRecordMac {
            key: key.as_bytes().to_vec(),
        }
    }

    pub fn compute(&self, swap: &SwapDao) -> String {
        let material = format!(
            "{}#{}#{}#{}#{}#{}#{}#{}#{}#{}#{}",
            MAC_SCHEMA_VERSION,
            swap.status,
            swap.sponsor,
            swap.src_token_addr,
            swap.dst_token_addr,
            swap.symbol,
            swap.amount,
            swap.decimals,
            swap.direction,
            swap.start_tx_hash,
            swap.fill_tx_hash,
        );
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(material.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    pub fn seal(&self, swap: &mut SwapDao) {
        swap.record_hash = self.compute(swap);
    }

    pub fn verify(&self, swap: &SwapDao) -> bool {
        swap.record_hash == self.compute(swap)
    }
}
