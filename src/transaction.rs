use crate::contracts::{encode_fill_swap, DUMMY_RPC_PROVIDER};
use crate::engine::ChainLane;
use crate::err_from;
use crate::error::EngineError;
use crate::error::*;
use web3::types::{Bytes, CallRequest, SignedTransaction, TransactionParameters, U256};

use crate::eth::get_eth_addr_from_secret;
use web3::types::Address;

const GAS_SAFETY_MARGIN: u64 = 20000;

pub struct BuiltFillTx {
    pub signed: SignedTransaction,
    pub gas_price: U256,
}

/// Build and sign a fill transaction for the destination lane. Caller must
/// hold the lane's broadcast guard: the pending nonce read here is only valid
/// while no other fill for this lane is in flight.
pub async fn build_fill_transaction(
    lane: &ChainLane,
    to_chain_id: U256,
    sponsor: Address,
    amount: U256,
) -> Result<BuiltFillTx, EngineError> {
    let call_data = encode_fill_swap(to_chain_id, sponsor, amount).map_err(err_from!())?;
    let from_addr = get_eth_addr_from_secret(&lane.secret_key);

    let mut gas_price = lane.client.suggest_gas_price().await.map_err(err_from!())?;
    if let Some(max_gas_price) = lane.max_gas_price {
        if gas_price > max_gas_price {
            log::warn!(
                "Suggested gas price {} above configured maximum {}, clamping",
                gas_price,
                max_gas_price
            );
            gas_price = max_gas_price;
        }
    }

    let nonce = lane
        .client
        .pending_nonce(from_addr)
        .await
        .map_err(err_from!())?;

    let gas_limit = match lane.gas_limit {
        Some(limit) => U256::from(limit),
        None => {
            let call = CallRequest {
                from: Some(from_addr),
                to: Some(lane.swap_agent_addr),
                gas: None,
                gas_price: None,
                value: None,
                data: Some(Bytes(call_data.clone())),
                transaction_type: None,
                access_list: None,
                max_fee_per_gas: None,
                max_priority_fee_per_gas: None,
            };
            let gas_est = lane.client.estimate_gas(call).await.map_err(err_from!())?;
            gas_est + U256::from(GAS_SAFETY_MARGIN)
        }
    };

    let tx_object = TransactionParameters {
        nonce: Some(nonce),
        to: Some(lane.swap_agent_addr),
        gas: gas_limit,
        gas_price: Some(gas_price),
        value: U256::zero(),
        data: Bytes(call_data),
        chain_id: Some(lane.chain_id),
        transaction_type: None,
        access_list: None,
        max_fee_per_gas: None,
        max_priority_fee_per_gas: None,
    };
    log::debug!("Signing fill transaction: {:?}", tx_object);
    let signed = DUMMY_RPC_PROVIDER
        .accounts()
        .sign_transaction(tx_object, &lane.secret_key)
        .await
        .map_err(err_from!())?;

    Ok(BuiltFillTx { signed, gas_price })
}
