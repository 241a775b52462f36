use serde::Deserialize;
use std::collections::btree_map::BTreeMap as Map;

use std::path::Path;

use crate::error::*;
use crate::{err_custom_create, err_from};
use tokio::fs;
use web3::types::Address;

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Engine {
    pub confirm_depth: u64,
    pub batch_size: i64,
    pub sleep_time_s: u64,
    pub track_sent_tx_batch_size: i64,
    pub max_retry: i64,
    pub retry_backoff_s: i64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    pub chain: Map<String, Chain>,
    pub engine: Engine,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Chain {
    pub rpc_endpoint: String,
    pub swap_agent_addr: Address,
    pub max_track_retry: i64,
    pub wait_ms_between_swaps: u64,
    pub rpc_timeout_s: Option<u64>,
    pub gas_limit: Option<u64>,
    pub max_gas_price_gwei: Option<f64>,
}

impl Config {
    pub fn load_from_str(str: &str) -> Result<Self, EngineError> {
        match toml::from_str(str) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", str, e)),
        }
    }

    pub async fn load<P: AsRef<Path> + std::fmt::Display>(path: P) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(&path).await.map_err(err_from!())?;
        match toml::from_str(&contents) {
            Ok(config) => Ok(config),
            Err(e) => Err(err_custom_create!("Failed to parse toml {}: {}", path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config() {
        let config = Config::load_from_str(
            r#"
[chain.a]
rpc-endpoint = "http://127.0.0.1:8545"
swap-agent-addr = "0x0000000a0000000a0000000a0000000a0000000a"
max-track-retry = 10
wait-ms-between-swaps = 500

[chain.b]
rpc-endpoint = "http://127.0.0.1:8546"
swap-agent-addr = "0x0000000b0000000b0000000b0000000b0000000b"
max-track-retry = 20
wait-ms-between-swaps = 300
rpc-timeout-s = 10
gas-limit = 200000
max-gas-price-gwei = 300.0

[chain.c]
rpc-endpoint = "http://127.0.0.1:8547"
swap-agent-addr = "0x0000000c0000000c0000000c0000000c0000000c"
max-track-retry = 30
wait-ms-between-swaps = 100

[engine]
confirm-depth = 12
batch-size = 50
sleep-time-s = 5
track-sent-tx-batch-size = 100
max-retry = 5
retry-backoff-s = 30
"#,
        )
        .unwrap();
        assert_eq!(config.chain.len(), 3);
        assert_eq!(config.engine.confirm_depth, 12);
        assert_eq!(config.chain["b"].gas_limit, Some(200000));
        assert_eq!(config.chain["b"].rpc_timeout_s, Some(10));
        assert!(config.chain["a"].gas_limit.is_none());
        assert!(config.chain["a"].rpc_timeout_s.is_none());
    }
}
