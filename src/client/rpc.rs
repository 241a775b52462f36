use super::ChainClient;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use std::future::Future;
use std::time::Duration;
use web3::error::TransportError;
use web3::transports::Http;
use web3::types::{Address, BlockNumber, Bytes, CallRequest, TransactionReceipt, H256, U256, U64};
use web3::Web3;

pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// ChainClient over a plain HTTP JSON-RPC endpoint. Every call carries the
/// configured per-chain deadline.
pub struct Web3ChainClient {
    web3: Web3<Http>,
    call_timeout: Duration,
}

impl Web3ChainClient {
    pub fn new(endpoint: &str, call_timeout: Duration) -> Result<Self, web3::Error> {
        let transport = Http::new(endpoint)?;
        Ok(Web3ChainClient {
            web3: Web3::new(transport),
            call_timeout,
        })
    }

    async fn with_deadline<T>(
        &self,
        fut: impl Future<Output = Result<T, web3::Error>>,
    ) -> Result<T, web3::Error> {
        match tokio::time::timeout(self.call_timeout, fut).await {
            Ok(res) => res,
            Err(_elapsed) => Err(web3::Error::Transport(TransportError::Message(format!(
                "request timed out after {:?}",
                self.call_timeout
            )))),
        }
    }
}

impl ChainClient for Web3ChainClient {
    fn chain_id(&self) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { self.with_deadline(self.web3.eth().chain_id()).await }.boxed()
    }

    fn suggest_gas_price(&self) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { self.with_deadline(self.web3.eth().gas_price()).await }.boxed()
    }

    fn pending_nonce(&self, address: Address) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move {
            self.with_deadline(
                self.web3
                    .eth()
                    .transaction_count(address, Some(BlockNumber::Pending)),
            )
            .await
        }
        .boxed()
    }

    fn estimate_gas(&self, call: CallRequest) -> BoxFuture<'_, Result<U256, web3::Error>> {
        async move { self.with_deadline(self.web3.eth().estimate_gas(call, None)).await }.boxed()
    }

    fn send_raw_transaction(&self, rlp: Bytes) -> BoxFuture<'_, Result<H256, web3::Error>> {
        async move { self.with_deadline(self.web3.eth().send_raw_transaction(rlp)).await }.boxed()
    }

    fn block_number(&self) -> BoxFuture<'_, Result<U64, web3::Error>> {
        async move { self.with_deadline(self.web3.eth().block_number()).await }.boxed()
    }

    fn transaction_receipt(
        &self,
        tx_hash: H256,
    ) -> BoxFuture<'_, Result<Option<TransactionReceipt>, web3::Error>> {
        async move {
            self.with_deadline(self.web3.eth().transaction_receipt(tx_hash))
                .await
        }
        .boxed()
    }
}
