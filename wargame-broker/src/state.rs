//! Relay state
//!
//! A single slot holding the most recent move. Both game instances poll
//! the same slot and pick out the turn they are waiting for.

use tokio::sync::RwLock;
use wargame_core::BrokerMove;

/// Server-wide shared state
pub struct RelayState {
    pub latest: RwLock<Option<BrokerMove>>,
    /// Moves accepted since start or last reset
    pub relayed: RwLock<u64>,
}

impl RelayState {
    pub fn new() -> Self {
        Self {
            latest: RwLock::new(None),
            relayed: RwLock::new(0),
        }
    }
}

impl Default for RelayState {
    fn default() -> Self {
        Self::new()
    }
}
