use crate::db::model::SwapPairDao;
use crate::error::EngineError;
use crate::error::{ErrorBag, ValidationError};
use crate::{err_create, err_custom_create};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::str::FromStr;
use web3::types::{Address, U256};

/// In-memory metadata for one bridged token pair.
#[derive(Clone, Debug)]
pub struct SwapPairIns {
    pub symbol: String,
    pub name: String,
    pub decimals: i64,
    pub low_bound: U256,
    pub upper_bound: U256,
    pub src_token_addr: Address,
    pub dst_token_addr: Address,
}

impl SwapPairIns {
    fn from_dao(pair: &SwapPairDao) -> Result<Self, EngineError> {
        let low_bound = U256::from_dec_str(&pair.low_bound).map_err(|_err| {
            err_create!(ValidationError::new(&format!(
                "invalid lowBound amount: {}",
                pair.low_bound
            )))
        })?;
        let upper_bound = U256::from_dec_str(&pair.upper_bound).map_err(|_err| {
            err_create!(ValidationError::new(&format!(
                "invalid upperBound amount: {}",
                pair.upper_bound
            )))
        })?;
        let src_token_addr = Address::from_str(&pair.src_token_addr)
            .map_err(|_err| err_custom_create!("invalid token address: {}", pair.src_token_addr))?;
        let dst_token_addr = Address::from_str(&pair.dst_token_addr)
            .map_err(|_err| err_custom_create!("invalid token address: {}", pair.dst_token_addr))?;
        Ok(SwapPairIns {
            symbol: pair.symbol.clone(),
            name: pair.name.clone(),
            decimals: pair.decimals,
            low_bound,
            upper_bound,
            src_token_addr,
            dst_token_addr,
        })
    }
}

#[derive(Default)]
struct RegistryInner {
    pairs_by_dst: HashMap<Address, SwapPairIns>,
    src_to_dst: HashMap<Address, Address>,
    dst_to_src: HashMap<Address, Address>,
}

/// Pair metadata shared by the ingestor and the admin surface. Mutators take
/// the write lock, readers the read lock.
pub struct SwapPairRegistry {
    inner: RwLock<RegistryInner>,
}

impl SwapPairRegistry {
    pub fn new() -> Self {
        SwapPairRegistry {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    pub fn hydrate(&self, pairs: &[SwapPairDao]) -> Result<usize, EngineError> {
        for pair in pairs {
            self.add_pair(pair)?;
        }
        Ok(pairs.len())
    }

    pub fn add_pair(&self, pair: &SwapPairDao) -> Result<(), EngineError> {
        let ins = SwapPairIns::from_dao(pair)?;
        let mut inner = self.inner.write();
        inner.src_to_dst.insert(ins.src_token_addr, ins.dst_token_addr);
        inner.dst_to_src.insert(ins.dst_token_addr, ins.src_token_addr);
        inner.pairs_by_dst.insert(ins.dst_token_addr, ins.clone());
        log::info!(
            "Registered swap pair, symbol {}, src token {:#x}, dst token {:#x}",
            ins.symbol,
            ins.src_token_addr,
            ins.dst_token_addr
        );
        Ok(())
    }

    /// Updates bounds for an existing pair; `available = false` removes it.
    pub fn update_pair(&self, pair: &SwapPairDao) -> Result<(), EngineError> {
        let ins = SwapPairIns::from_dao(pair)?;
        let mut inner = self.inner.write();
        if !inner.pairs_by_dst.contains_key(&ins.dst_token_addr) {
            return Err(err_custom_create!(
                "swap pair instance doesn't exist: {:#x}",
                ins.dst_token_addr
            ));
        }
        if !pair.available {
            inner.pairs_by_dst.remove(&ins.dst_token_addr);
            inner.src_to_dst.remove(&ins.src_token_addr);
            inner.dst_to_src.remove(&ins.dst_token_addr);
            return Ok(());
        }
        let entry = inner
            .pairs_by_dst
            .get_mut(&ins.dst_token_addr)
            .ok_or_else(|| err_custom_create!("swap pair instance doesn't exist"))?;
        entry.low_bound = ins.low_bound;
        entry.upper_bound = ins.upper_bound;
        Ok(())
    }

    pub fn get_by_dst_token(&self, dst_token_addr: Address) -> Result<SwapPairIns, EngineError> {
        self.inner
            .read()
            .pairs_by_dst
            .get(&dst_token_addr)
            .cloned()
            .ok_or_else(|| {
                err_custom_create!("swap pair instance doesn't exist: {:#x}", dst_token_addr)
            })
    }

    /// Pair lookup the ingestor uses: the observed lock event carries the
    /// source-side token contract.
    pub fn resolve_source(&self, src_token_addr: Address) -> Option<SwapPairIns> {
        let inner = self.inner.read();
        let dst = inner.src_to_dst.get(&src_token_addr)?;
        inner.pairs_by_dst.get(dst).cloned()
    }
}

impl Default for SwapPairRegistry {
    fn default() -> Self {
        Self::new()
    }
}
