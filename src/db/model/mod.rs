mod swap_dao;
mod swap_fill_tx_dao;
mod swap_pair_dao;
mod swap_start_tx_log_dao;
mod types;

pub use swap_dao::SwapDao;
pub use swap_fill_tx_dao::SwapFillTxDao;
pub use swap_pair_dao::SwapPairDao;
pub use swap_start_tx_log_dao::SwapStartTxLogDao;
pub use types::{Chain, Direction, FillTxStatus, SwapStatus, TxLogPhase, TxLogStatus};
