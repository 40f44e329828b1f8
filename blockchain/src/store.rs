use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use common::{Block, GetHash};
use crypto::Hash128;

/// The block-hash-keyed store plus the current tip
///
/// This is both the in-memory chain state and the `GetBlockChain` wire type.
/// Blocks reference parents by hash, so forks coexist without cycles; the
/// ordered map keeps the canonical serialization identical across peers,
/// which chain election relies on
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockChain {
    /// Every accepted block, keyed by block hash
    pub blocks: BTreeMap<Hash128, Block>,

    /// Hash of the tip; the genesis hash while the store is empty
    pub newest_hash: Hash128,
}

impl BlockChain {
    /// Creates an empty chain whose tip is the genesis hash
    pub fn new(genesis_hash: Hash128) -> Self {
        BlockChain {
            blocks: BTreeMap::new(),
            newest_hash: genesis_hash,
        }
    }

    /// The block stored under `block_hash`
    pub fn get(&self, block_hash: &Hash128) -> Option<&Block> {
        self.blocks.get(block_hash)
    }

    /// Whether `block_hash` is stored
    pub fn contains(&self, block_hash: &Hash128) -> bool {
        self.blocks.contains_key(block_hash)
    }

    /// Hash of the current tip
    pub fn tip_hash(&self) -> Hash128 {
        self.newest_hash
    }

    /// Block number of the current tip; zero while the store is empty
    pub fn tip_num(&self) -> u32 {
        self.get(&self.newest_hash)
            .map(|block| block.block_num)
            .unwrap_or(0)
    }

    /// Stores a block without validating it and returns its hash
    ///
    /// The tip advances only for a strictly greater block number, so ties
    /// are broken in favor of the first block seen
    pub fn save_block(&mut self, block: Block) -> Hash128 {
        let block_hash = block.get_hash();
        let advances = block.block_num > self.tip_num();
        self.blocks.insert(block_hash, block);
        if advances {
            self.newest_hash = block_hash;
        }
        block_hash
    }

    /// Walks parent links from `from` towards the genesis hash
    ///
    /// The walk ends at the genesis hash, or early at a missing parent
    /// while the store is still catching up with the network
    pub fn iter_to_genesis(&self, from: Hash128, genesis_hash: Hash128) -> AncestryIter<'_> {
        AncestryIter {
            chain: self,
            cursor: from,
            genesis_hash,
        }
    }

    /// Hashes of the stored blocks whose parent is `block_hash`
    pub fn children(&self, block_hash: &Hash128) -> Vec<Hash128> {
        self.blocks
            .iter()
            .filter(|(_, block)| block.prev_hash == *block_hash)
            .map(|(child_hash, _)| *child_hash)
            .collect()
    }

    /// Number of stored blocks
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether no blocks are stored
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl GetHash for BlockChain {
    fn get_hash_blob(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("chain serialization cannot fail")
    }
}

/// Iterator over a chain's ancestry, tip towards genesis
pub struct AncestryIter<'a> {
    chain: &'a BlockChain,
    cursor: Hash128,
    genesis_hash: Hash128,
}

impl<'a> Iterator for AncestryIter<'a> {
    type Item = (Hash128, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == self.genesis_hash {
            return None;
        }
        let block_hash = self.cursor;
        let block = self.chain.get(&block_hash)?;
        self.cursor = block.prev_hash;
        Some((block_hash, block))
    }
}
