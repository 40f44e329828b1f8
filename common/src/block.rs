use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crypto::{Hash128, PublicKey};

use crate::{GetHash, OpRecord};

/// A single mined block
///
/// Operations are keyed by their op-hash in an ordered map so the canonical
/// JSON encoding, and therefore the block hash, is identical on every peer.
/// A block with no operations is a NoOp block, which is a derived property
/// rather than a separate type
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Strictly one more than the parent's block number
    pub block_num: u32,

    /// Hash of the parent block, or the genesis hash
    pub prev_hash: Hash128,

    /// Operations committed by this block, keyed by op-hash
    pub op_records: BTreeMap<Hash128, OpRecord>,

    /// Public key of the miner that found the nonce
    pub miner_pub_key: PublicKey,

    /// The proof-of-work nonce
    pub nonce: u32,
}

impl Block {
    /// Whether this block commits no operations
    pub fn is_noop(&self) -> bool {
        self.op_records.is_empty()
    }
}

impl GetHash for Block {
    fn get_hash_blob(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("block serialization cannot fail")
    }
}
