//! # Ink Miner Core
//!
//! This crate is a convenience wrapper around all the shared components of
//! an ink-miner peer (the chain store, the pending operation pool, the
//! miner's key pair and the network settings), plus the flows that operate
//! on them: gossip admission, the mining loop, the art-node operations and
//! N-confirmation waits

pub mod art;
pub mod confirm;
pub mod gossip;
pub mod miner;

use std::sync::{Arc, RwLock};

use blockchain::Blockchain;
use common::MinerNetSettings;
use crypto::{KeyPair, PublicKey};
use oppool::OpPool;

/// Shared state of one ink-miner peer
///
/// Lock ordering: whenever both locks are needed, the chain store lock is
/// acquired before the pending pool lock
#[derive(Clone)]
pub struct InkMinerCore {
    blockchain: Arc<RwLock<Blockchain>>,
    oppool: Arc<RwLock<OpPool>>,
    keypair: Arc<KeyPair>,
    settings: MinerNetSettings,
}

impl InkMinerCore {
    /// Builds the peer state for the given settings and identity
    pub fn new(settings: MinerNetSettings, keypair: KeyPair) -> Self {
        let blockchain = Arc::new(RwLock::new(Blockchain::new(settings.clone())));
        let oppool = Arc::new(RwLock::new(OpPool::new()));
        InkMinerCore {
            blockchain,
            oppool,
            keypair: Arc::new(keypair),
            settings,
        }
    }

    /// The shared chain store
    pub fn blockchain(&self) -> Arc<RwLock<Blockchain>> {
        self.blockchain.clone()
    }

    /// The shared pending pool
    pub fn oppool(&self) -> Arc<RwLock<OpPool>> {
        self.oppool.clone()
    }

    /// The miner's key pair
    pub fn keypair(&self) -> &KeyPair {
        &self.keypair
    }

    /// The miner's public key
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key
    }

    /// The network settings issued at registration
    pub fn settings(&self) -> &MinerNetSettings {
        &self.settings
    }
}
