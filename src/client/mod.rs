mod rpc;

pub use rpc::{Web3ChainClient, DEFAULT_RPC_TIMEOUT};

use futures_util::future::BoxFuture;
use web3::types::{Address, Bytes, CallRequest, TransactionReceipt, H256, U256, U64};

/// The slice of the JSON-RPC surface the engine needs from each chain.
/// Production uses [Web3ChainClient]; tests plug in programmable stubs.
pub trait ChainClient: Send + Sync {
    fn chain_id(&self) -> BoxFuture<'_, Result<U256, web3::Error>>;

    fn suggest_gas_price(&self) -> BoxFuture<'_, Result<U256, web3::Error>>;

    fn pending_nonce(&self, address: Address) -> BoxFuture<'_, Result<U256, web3::Error>>;

    fn estimate_gas(&self, call: CallRequest) -> BoxFuture<'_, Result<U256, web3::Error>>;

    fn send_raw_transaction(&self, rlp: Bytes) -> BoxFuture<'_, Result<H256, web3::Error>>;

    fn block_number(&self) -> BoxFuture<'_, Result<U64, web3::Error>>;

    fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, web3::Error>>;
}

/// Sentinel emitted by geth-family nodes when a same-nonce replacement does
/// not outbid the in-flight transaction. Recovery differs from every other
/// broadcast error, so it gets its own classification.
pub const REPLACE_UNDERPRICED_SENTINEL: &str = "replacement transaction underpriced";

pub fn is_replace_underpriced(err: &web3::Error) -> bool {
    match err {
        web3::Error::Rpc(e) => e.message.contains(REPLACE_UNDERPRICED_SENTINEL),
        _ => false,
    }
}
