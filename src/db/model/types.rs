use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the three chain slots the engine is wired to. Which concrete EVM
/// network each slot maps to is decided by configuration.
#[derive(
    Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Chain {
    A,
    B,
    C,
}

impl Chain {
    pub const ALL: [Chain; 3] = [Chain::A, Chain::B, Chain::C];
}

impl Display for Chain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Chain::A => write!(f, "A"),
            Chain::B => write!(f, "B"),
            Chain::C => write!(f, "C"),
        }
    }
}

/// Ordered (source, destination) chain pair of a swap.
#[derive(
    Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub enum Direction {
    A2B,
    A2C,
    B2A,
    B2C,
    C2A,
    C2B,
}

impl Direction {
    pub fn source(&self) -> Chain {
        match self {
            Direction::A2B | Direction::A2C => Chain::A,
            Direction::B2A | Direction::B2C => Chain::B,
            Direction::C2A | Direction::C2B => Chain::C,
        }
    }

    pub fn dest(&self) -> Chain {
        match self {
            Direction::B2A | Direction::C2A => Chain::A,
            Direction::A2B | Direction::C2B => Chain::B,
            Direction::A2C | Direction::B2C => Chain::C,
        }
    }

    /// None when source == dest; a swap never settles on its own chain.
    pub fn from_route(source: Chain, dest: Chain) -> Option<Direction> {
        match (source, dest) {
            (Chain::A, Chain::B) => Some(Direction::A2B),
            (Chain::A, Chain::C) => Some(Direction::A2C),
            (Chain::B, Chain::A) => Some(Direction::B2A),
            (Chain::B, Chain::C) => Some(Direction::B2C),
            (Chain::C, Chain::A) => Some(Direction::C2A),
            (Chain::C, Chain::B) => Some(Direction::C2B),
            _ => None,
        }
    }

    /// The two directions a filler for the given destination chain watches.
    pub fn into_dest(dest: Chain) -> [Direction; 2] {
        match dest {
            Chain::A => [Direction::B2A, Direction::C2A],
            Chain::B => [Direction::A2B, Direction::C2B],
            Chain::C => [Direction::A2C, Direction::B2C],
        }
    }

    /// The two directions originating on the given source chain.
    pub fn from_source(source: Chain) -> [Direction; 2] {
        match source {
            Chain::A => [Direction::A2B, Direction::A2C],
            Chain::B => [Direction::B2A, Direction::B2C],
            Chain::C => [Direction::C2A, Direction::C2B],
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::A2B => write!(f, "A2B"),
            Direction::A2C => write!(f, "A2C"),
            Direction::B2A => write!(f, "B2A"),
            Direction::B2C => write!(f, "B2C"),
            Direction::C2A => write!(f, "C2A"),
            Direction::C2B => write!(f, "C2B"),
        }
    }
}

#[derive(Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapStatus {
    TokenReceived,
    Confirmed,
    Sending,
    Sent,
    Success,
    SendFailed,
    QuoteRejected,
}

impl Display for SwapStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SwapStatus::TokenReceived => write!(f, "TokenReceived"),
            SwapStatus::Confirmed => write!(f, "Confirmed"),
            SwapStatus::Sending => write!(f, "Sending"),
            SwapStatus::Sent => write!(f, "Sent"),
            SwapStatus::Success => write!(f, "Success"),
            SwapStatus::SendFailed => write!(f, "SendFailed"),
            SwapStatus::QuoteRejected => write!(f, "QuoteRejected"),
        }
    }
}

#[derive(Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxLogStatus {
    Unconfirmed,
    Confirmed,
}

/// Advances Seen -> ConfirmRequest -> AckRequest, never rewinds.
#[derive(Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxLogPhase {
    Seen,
    ConfirmRequest,
    AckRequest,
}

#[derive(Serialize, Deserialize, sqlx::Type, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillTxStatus {
    Created,
    Sent,
    Success,
    Failed,
    Missing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_accessors() {
        for dir in [
            Direction::A2B,
            Direction::A2C,
            Direction::B2A,
            Direction::B2C,
            Direction::C2A,
            Direction::C2B,
        ] {
            assert_ne!(dir.source(), dir.dest());
            assert_eq!(Direction::from_route(dir.source(), dir.dest()), Some(dir));
            assert!(Direction::into_dest(dir.dest()).contains(&dir));
            assert!(Direction::from_source(dir.source()).contains(&dir));
        }
    }

    #[test]
    fn test_same_chain_route_rejected() {
        for chain in Chain::ALL {
            assert_eq!(Direction::from_route(chain, chain), None);
        }
    }
}
