pub mod confirm;
pub mod filler;
pub mod monitor;
pub mod retry;
pub mod track;

use crate::client::{ChainClient, Web3ChainClient};
use crate::db::model::{Chain, Direction, SwapDao, SwapStatus};
use crate::db::ops::*;
use crate::error::EngineError;
use crate::error::{ErrorBag, IntegrityError};
use crate::events::{send_engine_event, EngineEvent, EngineEventContent};
use crate::mac::SwapRecordMac;
use crate::registry::{SwapPairIns, SwapPairRegistry};
use crate::setup::EngineSetup;
use crate::{err_create, err_custom_create, err_from};
use secp256k1::SecretKey;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use web3::types::{Address, U256};

/// Owned per-destination-chain resources. The broadcast guard serializes
/// nonce read, signing, fill-row insert and broadcast within one chain;
/// without it concurrent fillers would corrupt the nonce sequence.
pub struct ChainLane {
    pub chain: Chain,
    pub chain_id: u64,
    pub client: Arc<dyn ChainClient>,
    pub secret_key: SecretKey,
    pub swap_agent_addr: Address,
    pub wait_between_swaps: Duration,
    pub max_track_retry: i64,
    pub gas_limit: Option<u64>,
    pub max_gas_price: Option<U256>,
    pub broadcast_guard: tokio::sync::Mutex<()>,
}

/// The swap engine: shared store handle, MAC sealer, pair registry and the
/// three chain lanes. Daemons coordinate exclusively through database rows.
pub struct SwapEngine {
    pub conn: SqlitePool,
    pub batch_size: i64,
    pub sleep_time: Duration,
    pub track_sent_tx_batch_size: i64,
    pub confirm_depth: u64,
    pub max_retry: i64,
    pub retry_backoff: Duration,
    mac: SwapRecordMac,
    registry: SwapPairRegistry,
    lanes: BTreeMap<Chain, Arc<ChainLane>>,
    event_sender: Option<mpsc::Sender<EngineEvent>>,
    stop_requested: AtomicBool,
}

impl SwapEngine {
    /// Wire the engine with explicit chain clients. Pair definitions are
    /// hydrated from the store and each lane's chain id is fetched from its
    /// client, so the clients must be reachable at boot.
    pub async fn new(
        conn: SqlitePool,
        setup: EngineSetup,
        clients: BTreeMap<Chain, Arc<dyn ChainClient>>,
        event_sender: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<Arc<Self>, EngineError> {
        let registry = SwapPairRegistry::new();
        let pairs = get_available_swap_pairs(&conn).await.map_err(err_from!())?;
        let hydrated = registry.hydrate(&pairs)?;
        log::info!("Hydrated {} swap pairs from the store", hydrated);

        let mut lanes = BTreeMap::new();
        for (chain, lane_setup) in &setup.lanes {
            let client = clients.get(chain).cloned().ok_or_else(|| {
                err_custom_create!("No chain client provided for chain {}", chain)
            })?;
            let chain_id = client.chain_id().await.map_err(err_from!())?.as_u64();
            log::info!("Chain {} reports chain id {}", chain, chain_id);
            lanes.insert(
                *chain,
                Arc::new(ChainLane {
                    chain: *chain,
                    chain_id,
                    client,
                    secret_key: lane_setup.secret_key,
                    swap_agent_addr: lane_setup.swap_agent_addr,
                    wait_between_swaps: lane_setup.wait_between_swaps,
                    max_track_retry: lane_setup.max_track_retry,
                    gas_limit: lane_setup.gas_limit,
                    max_gas_price: lane_setup.max_gas_price,
                    broadcast_guard: tokio::sync::Mutex::new(()),
                }),
            );
        }

        Ok(Arc::new(SwapEngine {
            conn,
            batch_size: setup.batch_size,
            sleep_time: setup.sleep_time,
            track_sent_tx_batch_size: setup.track_sent_tx_batch_size,
            confirm_depth: setup.confirm_depth,
            max_retry: setup.max_retry,
            retry_backoff: setup.retry_backoff,
            mac: SwapRecordMac::new(&setup.hmac_key),
            registry,
            lanes,
            event_sender,
            stop_requested: AtomicBool::new(false),
        }))
    }

    /// Wire the engine against the HTTP endpoints from the setup.
    pub async fn connect(
        conn: SqlitePool,
        setup: EngineSetup,
        event_sender: Option<mpsc::Sender<EngineEvent>>,
    ) -> Result<Arc<Self>, EngineError> {
        let mut clients: BTreeMap<Chain, Arc<dyn ChainClient>> = BTreeMap::new();
        for (chain, lane_setup) in &setup.lanes {
            let client = Web3ChainClient::new(&lane_setup.rpc_endpoint, lane_setup.rpc_timeout)
                .map_err(err_from!())?;
            clients.insert(*chain, Arc::new(client));
        }
        Self::new(conn, setup, clients, event_sender).await
    }

    /// Spawn all daemons. They coordinate through the store only and shut
    /// down cooperatively after [request_stop](Self::request_stop).
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        let mut handles = vec![
            tokio::spawn(monitor::monitor_loop(self.clone())),
            tokio::spawn(confirm::confirm_loop(self.clone())),
        ];
        for chain in Chain::ALL {
            handles.push(tokio::spawn(filler::filler_loop(self.clone(), chain)));
        }
        handles.push(tokio::spawn(track::reap_missing_loop(self.clone())));
        handles.push(tokio::spawn(track::track_sent_loop(self.clone())));
        handles.push(tokio::spawn(retry::retry_loop(self.clone())));
        handles
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Relaxed);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_requested.load(Ordering::Relaxed)
    }

    pub(crate) async fn idle_sleep(&self) {
        tokio::time::sleep(self.sleep_time).await;
    }

    pub(crate) fn lane(&self, chain: Chain) -> Arc<ChainLane> {
        self.lanes
            .get(&chain)
            .expect("engine always holds all three lanes")
            .clone()
    }

    pub(crate) fn lanes(&self) -> &BTreeMap<Chain, Arc<ChainLane>> {
        &self.lanes
    }

    pub fn registry(&self) -> &SwapPairRegistry {
        &self.registry
    }

    // Admin surface; the HTTP layer in front of it is out of scope.

    pub fn add_swap_pair(&self, pair: &crate::db::model::SwapPairDao) -> Result<(), EngineError> {
        self.registry.add_pair(pair)
    }

    pub fn update_swap_pair(
        &self,
        pair: &crate::db::model::SwapPairDao,
    ) -> Result<(), EngineError> {
        self.registry.update_pair(pair)
    }

    pub fn get_swap_pair(&self, dst_token_addr: Address) -> Result<SwapPairIns, EngineError> {
        self.registry.get_by_dst_token(dst_token_addr)
    }

    pub(crate) fn seal_swap(&self, swap: &mut SwapDao) {
        self.mac.seal(swap);
    }

    pub(crate) fn verify_swap(&self, swap: &SwapDao) -> bool {
        self.mac.verify(swap)
    }

    /// Load a swap by start tx hash and verify its record MAC. A row failing
    /// verification is never returned; the urgent alert is emitted here.
    pub(crate) async fn load_swap_verified<'c, E>(
        &self,
        executor: E,
        start_tx_hash: &str,
    ) -> Result<SwapDao, EngineError>
    where
        E: sqlx::Executor<'c, Database = sqlx::Sqlite>,
    {
        let swap = get_swap_by_start_tx_hash(executor, start_tx_hash)
            .await
            .map_err(err_from!())?
            .ok_or_else(|| err_custom_create!("swap not found for start tx {}", start_tx_hash))?;
        if !self.verify_swap(&swap) {
            log::error!("verify hmac of swap failed: {}", start_tx_hash);
            self.emit(EngineEventContent::IntegrityViolation {
                start_tx_hash: start_tx_hash.to_string(),
            })
            .await;
            return Err(err_create!(IntegrityError::new(start_tx_hash)));
        }
        Ok(swap)
    }

    /// Park a swap in QuoteRejected with the reason in its log column.
    pub(crate) async fn reject_swap(
        &self,
        swap: &mut SwapDao,
        reason: &str,
    ) -> Result<(), EngineError> {
        let mut db_transaction = self.conn.begin().await.map_err(err_from!())?;
        swap.status = SwapStatus::QuoteRejected;
        swap.log = reason.to_string();
        self.seal_swap(swap);
        update_swap(&mut *db_transaction, swap)
            .await
            .map_err(err_from!())?;
        db_transaction.commit().await.map_err(err_from!())?;
        Ok(())
    }

    /// Decode the destination chain declared by a lock event into a routed
    /// direction. Unknown or same-chain destinations are not routable.
    pub(crate) fn route_direction(&self, source: Chain, to_chain_id: &str) -> Option<Direction> {
        let want = U256::from_dec_str(to_chain_id).ok()?;
        for (chain, lane) in &self.lanes {
            if *chain != source && U256::from(lane.chain_id) == want {
                return Direction::from_route(source, *chain);
            }
        }
        None
    }

    pub(crate) async fn emit(&self, content: EngineEventContent) {
        send_engine_event(&self.event_sender, content).await;
    }
}
