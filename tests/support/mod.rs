use chrono::Utc;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use sqlx::SqlitePool;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use swap_engine_lib::client::ChainClient;
use swap_engine_lib::config::Config;
use swap_engine_lib::db::model::*;
use swap_engine_lib::db::ops::*;
use swap_engine_lib::db::{connect_sqlite_store, SqliteStore};
use swap_engine_lib::engine::SwapEngine;
use swap_engine_lib::events::{EngineEvent, EngineEventContent};
use swap_engine_lib::mac::SwapRecordMac;
use swap_engine_lib::setup::EngineSetup;
use tokio::sync::mpsc;
use web3::types::{
    Address, Bytes, CallRequest, TransactionReceipt, H256, U256, U64,
};

pub const HMAC_KEY: &str = "test-hmac-key";
pub const SRC_TOKEN: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
pub const DST_TOKEN: &str = "0xe7f1725e7734ce288f8367e1bb143e90bb3f0512";
pub const SPONSOR: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

pub const CHAIN_ID_A: u64 = 111;
pub const CHAIN_ID_B: u64 = 222;
pub const CHAIN_ID_C: u64 = 333;

const PRIV_KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const PRIV_KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const PRIV_KEY_C: &str = "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

const TEST_CONFIG: &str = r#"
[chain.a]
rpc-endpoint = "http://127.0.0.1:8545"
swap-agent-addr = "0x00000000000000000000000000000000000000aa"
max-track-retry = 2
wait-ms-between-swaps = 0

[chain.b]
rpc-endpoint = "http://127.0.0.1:8546"
swap-agent-addr = "0x00000000000000000000000000000000000000bb"
max-track-retry = 2
wait-ms-between-swaps = 0
gas-limit = 120000

[chain.c]
rpc-endpoint = "http://127.0.0.1:8547"
swap-agent-addr = "0x00000000000000000000000000000000000000cc"
max-track-retry = 2
wait-ms-between-swaps = 0

[engine]
confirm-depth = 3
batch-size = 50
sleep-time-s = 0
track-sent-tx-batch-size = 100
max-retry = 3
retry-backoff-s = 0
"#;

pub fn rpc_error(message: &str) -> web3::Error {
    web3::Error::Rpc(jsonrpc_core::Error {
        code: jsonrpc_core::ErrorCode::ServerError(-32000),
        message: message.to_string(),
        data: None,
    })
}

/// Programmable ChainClient: broadcast results are queued, receipts and the
/// chain head are set by the test.
pub struct StubChainClient {
    chain_id: u64,
    gas_price: U256,
    nonce: AtomicU64,
    block_number: AtomicU64,
    send_results: Mutex<VecDeque<Result<(), web3::Error>>>,
    receipts: Mutex<HashMap<H256, TransactionReceipt>>,
    broadcast_count: AtomicU64,
}

impl StubChainClient {
    pub fn new(chain_id: u64) -> Arc<Self> {
        Arc::new(StubChainClient {
            chain_id,
            gas_price: U256::from(2_000_000_000u64),
            nonce: AtomicU64::new(0),
            block_number: AtomicU64::new(0),
            send_results: Mutex::new(VecDeque::new()),
            receipts: Mutex::new(HashMap::new()),
            broadcast_count: AtomicU64::new(0),
        })
    }

    pub fn gas_price(&self) -> U256 {
        self.gas_price
    }

    pub fn push_send_result(&self, result: Result<(), web3::Error>) {
        self.send_results.lock().unwrap().push_back(result);
    }

    pub fn set_block_number(&self, block: u64) {
        self.block_number.store(block, Ordering::SeqCst);
    }

    pub fn set_receipt(&self, tx_hash: H256, block: u64, gas_used: u64, ok: bool) {
        let receipt = TransactionReceipt {
            transaction_hash: tx_hash,
            block_hash: Some(H256::zero()),
            block_number: Some(U64::from(block)),
            gas_used: Some(U256::from(gas_used)),
            status: Some(U64::from(u64::from(ok))),
            ..Default::default()
        };
        self.receipts.lock().unwrap().insert(tx_hash, receipt);
    }

    pub fn broadcasts(&self) -> u64 {
        self.broadcast_count.load(Ordering::SeqCst)
    }
}

impl ChainClient for StubChainClient {
    fn chain_id(&self) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { Ok(U256::from(self.chain_id)) }.boxed()
    }

    fn suggest_gas_price(&self) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { Ok(self.gas_price) }.boxed()
    }

    fn pending_nonce(&self, _address: Address) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { Ok(U256::from(self.nonce.load(Ordering::SeqCst))) }.boxed()
    }

    fn estimate_gas(&self, _call: CallRequest) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { Ok(U256::from(90_000u64)) }.boxed()
    }

    fn send_raw_transaction(&self, _rlp: Bytes) -> BoxFuture<'_, Result<H256, web3::Error>> {
        async move {
            let queued = self.send_results.lock().unwrap().pop_front();
            match queued.unwrap_or(Ok(())) {
                Ok(()) => {
                    self.nonce.fetch_add(1, Ordering::SeqCst);
                    self.broadcast_count.fetch_add(1, Ordering::SeqCst);
                    Ok(H256::zero())
                }
                Err(e) => Err(e),
            }
        }
        .boxed()
    }

    fn block_number(&self) -> BoxFuture<'_, Result<U64, web3::Error>> {
        async move { Ok(U64::from(self.block_number.load(Ordering::SeqCst))) }.boxed()
    }

    fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, web3::Error>> {
        async move { Ok(self.receipts.lock().unwrap().get(&tx_hash).cloned()) }.boxed()
    }
}

pub struct TestHarness {
    pub engine: Arc<SwapEngine>,
    pub conn: SqlitePool,
    pub stubs: BTreeMap<Chain, Arc<StubChainClient>>,
    pub events: mpsc::Receiver<EngineEvent>,
    pub mac: SwapRecordMac,
}

pub fn test_pair() -> SwapPairDao {
    let now = Utc::now();
    SwapPairDao {
        id: 0,
        symbol: "TST".to_string(),
        name: "Test Token".to_string(),
        decimals: 18,
        src_token_addr: SRC_TOKEN.to_string(),
        dst_token_addr: DST_TOKEN.to_string(),
        low_bound: "0".to_string(),
        upper_bound: "1000000000000000000000000".to_string(),
        available: true,
        created_at: now,
        updated_at: now,
    }
}

/// In-memory store, three stub chain clients, the registry hydrated with one
/// A->B pair.
pub async fn spawn_engine(db_name: &str) -> anyhow::Result<TestHarness> {
    let _ = env_logger::builder().is_test(true).try_init();

    let conn = connect_sqlite_store(SqliteStore::Memory(db_name), true).await?;
    insert_swap_pair(&conn, &test_pair()).await?;

    let config = Config::load_from_str(TEST_CONFIG)?;
    let setup = EngineSetup::new(&config, HMAC_KEY, [PRIV_KEY_A, PRIV_KEY_B, PRIV_KEY_C])?;

    let mut stubs = BTreeMap::new();
    stubs.insert(Chain::A, StubChainClient::new(CHAIN_ID_A));
    stubs.insert(Chain::B, StubChainClient::new(CHAIN_ID_B));
    stubs.insert(Chain::C, StubChainClient::new(CHAIN_ID_C));

    let clients = stubs
        .iter()
        .map(|(chain, stub)| (*chain, stub.clone() as Arc<dyn ChainClient>))
        .collect();

    let (event_tx, event_rx) = mpsc::channel(100);
    let engine = SwapEngine::new(conn.clone(), setup, clients, Some(event_tx)).await?;

    Ok(TestHarness {
        engine,
        conn,
        stubs,
        events: event_rx,
        mac: SwapRecordMac::new(HMAC_KEY),
    })
}

impl TestHarness {
    pub fn stub(&self, chain: Chain) -> &Arc<StubChainClient> {
        &self.stubs[&chain]
    }

    /// Seed a confirmed A-side lock event the scraper would have produced.
    pub async fn seed_log(
        &self,
        tx_hash: &str,
        amount: &str,
        to_chain_id: &str,
        height: i64,
    ) -> anyhow::Result<SwapStartTxLogDao> {
        let now = Utc::now();
        let log = SwapStartTxLogDao {
            id: 0,
            tx_hash: tx_hash.to_string(),
            chain: Chain::A,
            token_addr: SRC_TOKEN.to_string(),
            from_address: SPONSOR.to_string(),
            amount: amount.to_string(),
            to_chain_id: to_chain_id.to_string(),
            height,
            status: TxLogStatus::Confirmed,
            phase: TxLogPhase::Seen,
            created_at: now,
            updated_at: now,
        };
        Ok(insert_start_tx_log(&self.conn, &log).await?)
    }

    pub async fn seed_swap(
        &self,
        start_tx_hash: &str,
        status: SwapStatus,
    ) -> anyhow::Result<SwapDao> {
        let now = Utc::now();
        let mut swap = SwapDao {
            id: 0,
            status,
            sponsor: SPONSOR.to_string(),
            src_token_addr: SRC_TOKEN.to_string(),
            dst_token_addr: DST_TOKEN.to_string(),
            symbol: "TST".to_string(),
            amount: "1000".to_string(),
            decimals: 18,
            direction: Direction::A2B,
            start_tx_hash: start_tx_hash.to_string(),
            fill_tx_hash: String::new(),
            to_chain_id: CHAIN_ID_B.to_string(),
            log: String::new(),
            record_hash: String::new(),
            retry_count: 0,
            created_at: now,
            updated_at: now,
        };
        self.mac.seal(&mut swap);
        Ok(insert_swap(&self.conn, &swap).await?)
    }

    pub async fn seed_fill_tx(
        &self,
        start_tx_hash: &str,
        fill_tx_hash: &str,
        status: FillTxStatus,
        track_retry_counter: i64,
    ) -> anyhow::Result<SwapFillTxDao> {
        let now = Utc::now();
        let fill_tx = SwapFillTxDao {
            id: 0,
            direction: Direction::A2B,
            start_swap_tx_hash: start_tx_hash.to_string(),
            fill_swap_tx_hash: fill_tx_hash.to_string(),
            gas_price: "2000000000".to_string(),
            height: 0,
            consumed_fee_amount: None,
            status,
            track_retry_counter,
            created_at: now,
            updated_at: now,
        };
        Ok(insert_fill_tx(&self.conn, &fill_tx).await?)
    }

    pub async fn swap(&self, start_tx_hash: &str) -> SwapDao {
        get_swap_by_start_tx_hash(&self.conn, start_tx_hash)
            .await
            .unwrap()
            .expect("swap should exist")
    }

    pub async fn log(&self, tx_hash: &str) -> SwapStartTxLogDao {
        get_start_tx_log(&self.conn, tx_hash)
            .await
            .unwrap()
            .expect("log should exist")
    }

    pub async fn fill_txs(&self, start_tx_hash: &str) -> Vec<SwapFillTxDao> {
        get_fill_txs_by_start_tx_hash(&self.conn, start_tx_hash)
            .await
            .unwrap()
    }

    pub fn drain_events(&mut self) -> Vec<EngineEventContent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event.content);
        }
        drained
    }
}
