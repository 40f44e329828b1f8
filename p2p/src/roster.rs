use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::DirectoryClient;

/// The set of currently connected neighbor miners
///
/// Shared between the maintenance ticker and every fan-out; in the peer's
/// lock order this lock ranks below the chain store and the pending pool
#[derive(Clone, Default)]
pub struct Roster {
    addresses: Arc<RwLock<Vec<String>>>,
}

impl Roster {
    /// Creates an empty roster
    pub fn new() -> Self {
        Roster::default()
    }

    /// A copy of the current neighbor addresses
    pub fn snapshot(&self) -> Vec<String> {
        self.addresses.read().unwrap().clone()
    }

    /// Replaces the neighbor set
    pub fn replace(&self, addresses: Vec<String>) {
        *self.addresses.write().unwrap() = addresses;
    }

    /// Number of current neighbors
    pub fn len(&self) -> usize {
        self.addresses.read().unwrap().len()
    }

    /// Whether no neighbors are connected
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps the roster at or above the directory's minimum neighbor count
///
/// Checks every `heartbeat_ms` and refreshes from the directory whenever
/// the set has shrunk below the minimum. Directory trouble at steady state
/// is a warning, not an exit
pub async fn maintain(
    roster: Roster,
    directory: Arc<DirectoryClient>,
    min_connections: u8,
    heartbeat_ms: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_millis(heartbeat_ms.max(1)));
    loop {
        ticker.tick().await;
        if roster.len() >= usize::from(min_connections) {
            continue;
        }
        match directory.get_nodes().await {
            Ok(addresses) => {
                log::debug!("Refreshed {} neighbors from the directory", addresses.len());
                roster.replace(addresses);
            }
            Err(err) => log::warn!("Could not refresh neighbors from the directory: {}", err),
        }
    }
}

/// Heartbeats the directory server at half the heartbeat period so the
/// registration never lapses
pub async fn heartbeat_loop(directory: Arc<DirectoryClient>, heartbeat_ms: u64) {
    let mut ticker = tokio::time::interval(Duration::from_millis((heartbeat_ms / 2).max(1)));
    loop {
        ticker.tick().await;
        if let Err(err) = directory.heart_beat().await {
            log::warn!("Could not send heartbeat to the directory: {}", err);
        }
    }
}
