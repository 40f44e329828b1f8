//! The replicated chain: store, derived ledger views, validation, election

mod election;
mod error;
mod store;
mod validator;

/// Ledger views derived by traversal
pub mod views;

pub use election::elect;
pub use error::{Error, Result};
pub use store::{AncestryIter, BlockChain};
pub use validator::validate_block;

use common::{Block, MinerNetSettings, OpRecord};
use crypto::{Hash128, PublicKey};

/// Outcome of offering a block to the store
#[derive(Debug)]
pub enum InsertOutcome {
    /// The block validated and was committed under the returned hash
    Inserted(Hash128),
    /// The block was already stored; nothing changed
    Duplicate,
    /// The block failed validation and was not committed
    Rejected(Error),
}

/// The chain store bound to its network settings
///
/// This is the single owner of all accepted blocks. Nothing is committed
/// before it validates, and `newest_hash` only ever advances here
pub struct Blockchain {
    chain: BlockChain,
    settings: MinerNetSettings,
}

impl Blockchain {
    /// Creates an empty chain for the given network settings
    pub fn new(settings: MinerNetSettings) -> Self {
        Blockchain {
            chain: BlockChain::new(settings.genesis_block_hash),
            settings,
        }
    }

    /// The network settings this chain validates against
    pub fn settings(&self) -> &MinerNetSettings {
        &self.settings
    }

    /// The hash terminating every traversal
    pub fn genesis_hash(&self) -> Hash128 {
        self.settings.genesis_block_hash
    }

    /// The underlying store, also the `GetBlockChain` wire value
    pub fn chain(&self) -> &BlockChain {
        &self.chain
    }

    /// Hash of the current tip
    pub fn tip_hash(&self) -> Hash128 {
        self.chain.tip_hash()
    }

    /// Block number of the current tip
    pub fn tip_num(&self) -> u32 {
        self.chain.tip_num()
    }

    /// The block stored under `block_hash`
    pub fn get_block(&self, block_hash: &Hash128) -> Option<&Block> {
        self.chain.get(block_hash)
    }

    /// Validates and commits a block
    pub fn insert(&mut self, block: Block) -> InsertOutcome {
        match validator::validate_block(&self.chain, &self.settings, &block) {
            Ok(()) => InsertOutcome::Inserted(self.chain.save_block(block)),
            Err(Error::DuplicateBlock) => InsertOutcome::Duplicate,
            Err(err) => InsertOutcome::Rejected(err),
        }
    }

    /// Walks from the tip towards genesis
    pub fn iter_to_genesis(&self) -> AncestryIter<'_> {
        self.chain
            .iter_to_genesis(self.chain.tip_hash(), self.genesis_hash())
    }

    /// Ink balance of `key` at the current tip
    pub fn ink_balance(&self, key: &PublicKey) -> i64 {
        views::ink_balance(&self.chain, self.tip_hash(), &self.settings, key)
    }

    /// Live shapes visible to `key` at the current tip
    pub fn visible_shapes(&self, key: &PublicKey) -> Vec<String> {
        views::visible_shapes(&self.chain, self.tip_hash(), &self.settings, key)
    }

    /// Finds an operation in the tip's ancestry
    pub fn find_op(&self, op_hash: &Hash128) -> Option<(&OpRecord, Hash128)> {
        views::find_op(&self.chain, self.tip_hash(), self.genesis_hash(), op_hash)
    }

    /// Finds an operation and its confirmation depth below the tip
    pub fn op_confirmations(&self, op_hash: &Hash128) -> Option<(&OpRecord, Hash128, u32)> {
        let tip_num = self.tip_num();
        self.find_op(op_hash).map(|(op, block_hash)| {
            let block_num = self
                .chain
                .get(&block_hash)
                .map(|block| block.block_num)
                .unwrap_or(tip_num);
            (op, block_hash, tip_num - block_num)
        })
    }

    /// Whether the create under `op_hash` has not been deleted since
    pub fn create_is_live(&self, op_hash: &Hash128) -> bool {
        views::create_is_live(&self.chain, self.tip_hash(), self.genesis_hash(), op_hash)
    }

    /// Children of `block_hash`, or `None` for a hash this store never saw
    ///
    /// The genesis hash is a valid argument even though the genesis block is
    /// never stored
    pub fn children(&self, block_hash: &Hash128) -> Option<Vec<Hash128>> {
        if *block_hash != self.genesis_hash() && !self.chain.contains(block_hash) {
            return None;
        }
        Some(self.chain.children(block_hash))
    }

    /// Replaces the local chain with an elected one
    ///
    /// The caller is responsible for having validated the replacement with
    /// [`rebuild`]
    pub fn adopt(&mut self, chain: BlockChain) {
        self.chain = chain;
    }
}

/// Validates a candidate chain end-to-end by reinserting every block into a
/// fresh store, oldest first
///
/// Succeeds only if every block passes full validation. The candidate's own
/// tip claim is honored when it is consistent with the rebuilt store,
/// otherwise the rebuilt tip stands
pub fn rebuild(candidate: &BlockChain, settings: &MinerNetSettings) -> Result<Blockchain> {
    let mut rebuilt = Blockchain::new(settings.clone());

    let mut blocks: Vec<&Block> = candidate.blocks.values().collect();
    blocks.sort_by_key(|block| block.block_num);
    for block in blocks {
        if let InsertOutcome::Rejected(err) = rebuilt.insert((*block).clone()) {
            return Err(err);
        }
    }

    let claimed = candidate.newest_hash;
    let claim_consistent = rebuilt
        .get_block(&claimed)
        .map(|block| block.block_num == rebuilt.tip_num())
        .unwrap_or(false);
    if claim_consistent {
        rebuilt.chain.newest_hash = claimed;
    }
    Ok(rebuilt)
}
