use crate::client::DEFAULT_RPC_TIMEOUT;
use crate::config::Config;
use crate::db::model::Chain;
use crate::error::EngineError;
use crate::error::ErrorBag;
use crate::eth::load_secret_key;
use crate::utils::gwei_to_u256;
use crate::{err_custom_create, err_from};
use secp256k1::SecretKey;
use std::collections::BTreeMap;
use std::time::Duration;
use web3::types::{Address, U256};

/// Per-destination-chain runtime values resolved from config + secrets.
#[derive(Clone, Debug)]
pub struct LaneSetup {
    pub chain: Chain,
    pub rpc_endpoint: String,
    pub rpc_timeout: Duration,
    pub swap_agent_addr: Address,
    pub secret_key: SecretKey,
    pub max_track_retry: i64,
    pub wait_between_swaps: Duration,
    pub gas_limit: Option<u64>,
    pub max_gas_price: Option<U256>,
}

#[derive(Clone, Debug)]
pub struct EngineSetup {
    pub lanes: BTreeMap<Chain, LaneSetup>,
    pub hmac_key: String,
    pub confirm_depth: u64,
    pub batch_size: i64,
    pub sleep_time: Duration,
    pub track_sent_tx_batch_size: i64,
    pub max_retry: i64,
    pub retry_backoff: Duration,
}

impl EngineSetup {
    /// Private keys are given in chain order A, B, C; they never pass through
    /// the config file.
    pub fn new(
        config: &Config,
        hmac_key: &str,
        private_keys: [&str; 3],
    ) -> Result<Self, EngineError> {
        let mut lanes = BTreeMap::new();
        for (chain, key) in Chain::ALL.into_iter().zip(private_keys) {
            let slot = chain.to_string().to_lowercase();
            let chain_config = config
                .chain
                .get(&slot)
                .ok_or_else(|| err_custom_create!("No [chain.{}] section in config", slot))?;
            let max_gas_price = match chain_config.max_gas_price_gwei {
                Some(gwei) => Some(gwei_to_u256(gwei).map_err(err_from!())?),
                None => None,
            };
            lanes.insert(
                chain,
                LaneSetup {
                    chain,
                    rpc_endpoint: chain_config.rpc_endpoint.clone(),
                    rpc_timeout: chain_config
                        .rpc_timeout_s
                        .map(Duration::from_secs)
                        .unwrap_or(DEFAULT_RPC_TIMEOUT),
                    swap_agent_addr: chain_config.swap_agent_addr,
                    secret_key: load_secret_key(key)?,
                    max_track_retry: chain_config.max_track_retry,
                    wait_between_swaps: Duration::from_millis(chain_config.wait_ms_between_swaps),
                    gas_limit: chain_config.gas_limit,
                    max_gas_price,
                },
            );
        }

        if hmac_key.is_empty() {
            return Err(err_custom_create!("HMAC key must not be empty"));
        }

        Ok(EngineSetup {
            lanes,
            hmac_key: hmac_key.to_string(),
            confirm_depth: config.engine.confirm_depth,
            batch_size: config.engine.batch_size,
            sleep_time: Duration::from_secs(config.engine.sleep_time_s),
            track_sent_tx_batch_size: config.engine.track_sent_tx_batch_size,
            max_retry: config.engine.max_retry,
            retry_backoff: Duration::from_secs(config.engine.retry_backoff_s as u64),
        })
    }
}
