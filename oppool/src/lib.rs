//! The pending operation pool

use std::collections::{BTreeMap, HashMap};

use common::{Block, GetHash, OpRecord};
use crypto::Hash128;

/// A memory pool of operations admitted but not yet committed to any block
/// on the local tip's ancestry
///
/// Operations enter on client submission or gossip receipt and leave the
/// first time they are seen inside an inserted block
#[derive(Clone, Default)]
pub struct OpPool {
    ops: HashMap<Hash128, OpRecord>,
}

impl OpPool {
    /// Creates an empty pool
    pub fn new() -> Self {
        OpPool {
            ops: HashMap::new(),
        }
    }

    /// Admits an operation, returning its op-hash
    ///
    /// Re-admitting a pending operation is a no-op
    pub fn add_op(&mut self, op: OpRecord) -> Hash128 {
        let op_hash = op.get_hash();
        self.ops.entry(op_hash).or_insert(op);
        op_hash
    }

    /// Whether the pool holds the given op-hash
    pub fn has_op(&self, op_hash: &Hash128) -> bool {
        self.ops.contains_key(op_hash)
    }

    /// The pending record for the given op-hash
    pub fn get_op(&self, op_hash: &Hash128) -> Option<&OpRecord> {
        self.ops.get(op_hash)
    }

    /// Removes every operation the given block committed
    ///
    /// Called in the same critical section as the block's insertion so an
    /// operation can never be mined twice locally
    pub fn remove_included(&mut self, block: &Block) {
        for op_hash in block.op_records.keys() {
            self.ops.remove(op_hash);
        }
    }

    /// Removes every operation committed anywhere in an adopted chain
    pub fn retain_missing_from<'a>(&mut self, blocks: impl Iterator<Item = &'a Block>) {
        for block in blocks {
            self.remove_included(block);
        }
    }

    /// An ordered copy of the pool, suitable for a mining candidate
    pub fn snapshot(&self) -> BTreeMap<Hash128, OpRecord> {
        self.ops
            .iter()
            .map(|(op_hash, op)| (*op_hash, op.clone()))
            .collect()
    }

    /// Pending operations authored by the holder of `author_pub_key`
    pub fn ops_by_author<'a>(
        &'a self,
        author_pub_key: &'a crypto::PublicKey,
    ) -> impl Iterator<Item = &'a OpRecord> {
        self.ops
            .values()
            .filter(move |op| op.author_pub_key == *author_pub_key)
    }

    /// Pending operations authored by anyone else
    pub fn ops_by_others<'a>(
        &'a self,
        author_pub_key: &'a crypto::PublicKey,
    ) -> impl Iterator<Item = &'a OpRecord> {
        self.ops
            .values()
            .filter(move |op| op.author_pub_key != *author_pub_key)
    }

    /// Number of pending operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether no operations are pending
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use crypto::KeyPair;

    use super::*;

    fn record(keypair: &KeyPair, d: &str) -> OpRecord {
        let op = format!("<path d=\"{}\" stroke=\"red\" fill=\"transparent\"/>", d);
        OpRecord::signed(op, 20, keypair)
    }

    #[test]
    fn re_admission_is_a_no_op() {
        let keypair = KeyPair::generate();
        let op = record(&keypair, "M 0 0 L 20 20");

        let mut pool = OpPool::new();
        let op_hash = pool.add_op(op.clone());
        assert_eq!(pool.add_op(op), op_hash);
        assert_eq!(pool.len(), 1);
        assert!(pool.has_op(&op_hash));
    }

    #[test]
    fn removes_operations_committed_by_a_block() {
        let keypair = KeyPair::generate();
        let committed = record(&keypair, "M 0 0 L 20 20");
        let pending = record(&keypair, "M 30 30 L 40 40");

        let mut pool = OpPool::new();
        let committed_hash = pool.add_op(committed.clone());
        let pending_hash = pool.add_op(pending);

        let block = Block {
            block_num: 1,
            prev_hash: crypto::Hash128::try_from("83218ac34c1834c26781fe4bde918ee4").unwrap(),
            op_records: [(committed_hash, committed)].into_iter().collect(),
            miner_pub_key: keypair.public_key,
            nonce: 0,
        };

        pool.remove_included(&block);
        assert!(!pool.has_op(&committed_hash));
        assert!(pool.has_op(&pending_hash));
    }

    #[test]
    fn snapshot_is_sorted_by_op_hash() {
        let keypair = KeyPair::generate();
        let mut pool = OpPool::new();
        pool.add_op(record(&keypair, "M 0 0 L 20 20"));
        pool.add_op(record(&keypair, "M 30 30 L 40 40"));
        pool.add_op(record(&keypair, "M 50 50 L 60 60"));

        let snapshot = pool.snapshot();
        assert_eq!(snapshot.len(), 3);
        let hashes: Vec<_> = snapshot.keys().collect();
        let mut sorted = hashes.clone();
        sorted.sort();
        assert_eq!(hashes, sorted);
    }

    #[test]
    fn filters_by_author() {
        let author = KeyPair::generate();
        let other = KeyPair::generate();
        let mut pool = OpPool::new();
        pool.add_op(record(&author, "M 0 0 L 20 20"));
        pool.add_op(record(&other, "M 30 30 L 40 40"));

        assert_eq!(pool.ops_by_author(&author.public_key).count(), 1);
        assert_eq!(pool.ops_by_others(&author.public_key).count(), 1);
    }
}
