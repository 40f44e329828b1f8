//! Admission of gossiped operations and blocks
//!
//! Everything here is silent towards the network: invalid or duplicate
//! items are logged and dropped, never answered with an error

use blockchain::{rebuild, BlockChain, Error, InsertOutcome};
use common::{Block, GetHash, OpRecord};
use crypto::Hash128;

use crate::InkMinerCore;

/// What became of a gossiped block
#[derive(Debug, PartialEq, Eq)]
pub enum BlockReceipt {
    /// Validated and committed; fan the block out once
    Accepted(Hash128),
    /// Already stored; do not forward again
    AlreadyKnown,
    /// Parent unknown; fetch neighbor chains, reconcile, then retry once
    NeedsParent(Hash128),
    /// Failed validation; logged and dropped
    Rejected,
}

/// Admits a gossiped or client-submitted operation into the pending pool
///
/// Returns true when the operation was fresh and individually valid, in
/// which case the caller fans it out once to the current neighbors. The
/// partial check is signature, bounds and non-negative prospective ink
/// against the current tip; full legality is re-established when a block
/// carrying the operation is validated
pub fn receive_operation(core: &InkMinerCore, op: OpRecord) -> bool {
    let op_hash = op.get_hash();

    if !op.verify_signature() {
        log::debug!("Dropping operation {} with a bad signature", op_hash);
        return false;
    }

    let polyline = match op.path_d().map(geometry::path_to_polyline) {
        Some(Ok(polyline)) => polyline,
        _ => {
            log::debug!("Dropping operation {} with an unparseable path", op_hash);
            return false;
        }
    };

    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();

    if !op.is_delete() {
        let canvas = core.settings().canvas_settings;
        if geometry::out_of_bounds(&polyline, canvas.canvas_x_max, canvas.canvas_y_max) {
            log::debug!("Dropping operation {} drawing out of bounds", op_hash);
            return false;
        }
        if i64::from(op.ink_used) > blockchain.ink_balance(&op.author_pub_key) {
            log::debug!("Dropping operation {} overdrawing its author", op_hash);
            return false;
        }
    }

    let oppool = core.oppool();
    let mut oppool = oppool.write().unwrap();
    if oppool.has_op(&op_hash) {
        return false;
    }
    oppool.add_op(op);
    log::info!("Operation {} admitted to the pending pool", op_hash);
    true
}

/// Validates a gossiped block and commits it on success
///
/// Committed operations leave the pending pool in the same critical section
/// as the insertion, so the local miner can never mine them again
pub fn receive_block(core: &InkMinerCore, block: &Block) -> BlockReceipt {
    let blockchain = core.blockchain();
    let mut blockchain = blockchain.write().unwrap();

    match blockchain.insert(block.clone()) {
        InsertOutcome::Inserted(block_hash) => {
            core.oppool().write().unwrap().remove_included(block);
            log::info!(
                "Accepted block {} at height {} from the network",
                block_hash,
                block.block_num
            );
            BlockReceipt::Accepted(block_hash)
        }
        InsertOutcome::Duplicate => BlockReceipt::AlreadyKnown,
        InsertOutcome::Rejected(Error::UnknownParent(parent_hash)) => {
            log::debug!("Block references unknown parent {}", parent_hash);
            BlockReceipt::NeedsParent(parent_hash)
        }
        InsertOutcome::Rejected(err) => {
            log::debug!("Rejected gossiped block: {}", err);
            BlockReceipt::Rejected
        }
    }
}

/// Adopts the winning chain among the local one and the neighbors' copies
///
/// Neighbor chains that do not validate end-to-end are discarded before the
/// election. On adoption the pending pool drops every operation committed
/// anywhere in the new chain; in-flight confirmation waits for operations
/// that fell out of the ancestry observe the orphaning on their next poll.
/// Returns true when the local chain was replaced
pub fn reconcile(core: &InkMinerCore, neighbor_chains: Vec<BlockChain>) -> bool {
    let blockchain = core.blockchain();
    let mut blockchain = blockchain.write().unwrap();

    let mut candidates = vec![blockchain.chain().clone()];
    for chain in neighbor_chains {
        match rebuild(&chain, core.settings()) {
            Ok(rebuilt) => candidates.push(rebuilt.chain().clone()),
            Err(err) => log::debug!("Discarding a neighbor chain that fails validation: {}", err),
        }
    }

    let winner = match blockchain::elect(&candidates) {
        Some(winner) => winner,
        None => return false,
    };
    if winner == 0 {
        return false;
    }

    let adopted = candidates.swap_remove(winner);
    log::info!(
        "Adopting a chain of height {} over local height {}",
        adopted.tip_num(),
        blockchain.tip_num()
    );

    let oppool = core.oppool();
    let mut oppool = oppool.write().unwrap();
    oppool.retain_missing_from(adopted.blocks.values());
    blockchain.adopt(adopted);
    true
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::convert::TryFrom;

    use blockchain::Blockchain;
    use common::{difficulty, CanvasSettings, MinerNetSettings};
    use crypto::KeyPair;

    use super::*;

    fn settings() -> MinerNetSettings {
        MinerNetSettings {
            genesis_block_hash: Hash128::try_from("83218ac34c1834c26781fe4bde918ee4").unwrap(),
            min_num_miner_connections: 3,
            ink_per_op_block: 20,
            ink_per_noop_block: 10,
            heartbeat_ms: 2000,
            pow_difficulty_op_block: 1,
            pow_difficulty_noop_block: 1,
            canvas_settings: CanvasSettings {
                canvas_x_max: 200,
                canvas_y_max: 200,
            },
        }
    }

    fn core(keypair: KeyPair) -> InkMinerCore {
        InkMinerCore::new(settings(), keypair)
    }

    fn mine_on(chain: &Blockchain, ops: BTreeMap<Hash128, OpRecord>, miner: &KeyPair) -> Block {
        let num_zeros = if ops.is_empty() {
            chain.settings().pow_difficulty_noop_block
        } else {
            chain.settings().pow_difficulty_op_block
        };
        let mut block = Block {
            block_num: chain.tip_num() + 1,
            prev_hash: chain.tip_hash(),
            op_records: ops,
            miner_pub_key: miner.public_key,
            nonce: 0,
        };
        while !difficulty::verify_trailing_zeros(&block.get_hash(), num_zeros) {
            block.nonce += 1;
        }
        block
    }

    fn mine_noops(core: &InkMinerCore, miner: &KeyPair, count: u32) {
        for _ in 0..count {
            let block = {
                let blockchain = core.blockchain();
                let blockchain = blockchain.read().unwrap();
                mine_on(&blockchain, BTreeMap::new(), miner)
            };
            assert!(matches!(
                receive_block(core, &block),
                BlockReceipt::Accepted(_)
            ));
        }
    }

    fn create_record(keypair: &KeyPair, d: &str, ink_used: u32) -> OpRecord {
        OpRecord::signed(
            geometry::svg_path_string(d, "green", "transparent"),
            ink_used,
            keypair,
        )
    }

    #[test]
    fn admits_fresh_valid_operations_once() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());
        mine_noops(&core, &keypair, 3);

        let op = create_record(&keypair, "M 130 20 L 160 20", 30);
        assert!(receive_operation(&core, op.clone()));
        // The duplicate is dropped silently
        assert!(!receive_operation(&core, op.clone()));
        assert_eq!(core.oppool().read().unwrap().len(), 1);
    }

    #[test]
    fn drops_operations_failing_the_partial_check() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());
        mine_noops(&core, &keypair, 3);

        // Bad signature
        let mut op = create_record(&keypair, "M 130 20 L 160 20", 30);
        op.op_sig_r = op.op_sig_s.clone();
        assert!(!receive_operation(&core, op));

        // Out of bounds
        let op = create_record(&keypair, "M 130 20 L 230 20", 100);
        assert!(!receive_operation(&core, op));

        // Overdraws the author's 30 ink
        let op = create_record(&keypair, "M 0 0 L 40 0", 40);
        assert!(!receive_operation(&core, op));

        assert!(core.oppool().read().unwrap().is_empty());
    }

    #[test]
    fn accepted_blocks_clear_their_operations_from_the_pool() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());
        mine_noops(&core, &keypair, 3);

        let op = create_record(&keypair, "M 130 20 L 160 20", 30);
        assert!(receive_operation(&core, op.clone()));

        let block = {
            let blockchain = core.blockchain();
            let blockchain = blockchain.read().unwrap();
            let ops = [(op.get_hash(), op.clone())].into_iter().collect();
            mine_on(&blockchain, ops, &keypair)
        };
        assert!(matches!(
            receive_block(&core, &block),
            BlockReceipt::Accepted(_)
        ));
        assert!(core.oppool().read().unwrap().is_empty());
        assert_eq!(receive_block(&core, &block), BlockReceipt::AlreadyKnown);
    }

    #[test]
    fn unknown_parents_request_reconciliation() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());

        let foreign = InkMinerCore::new(settings(), KeyPair::generate());
        mine_noops(&foreign, &keypair, 2);
        let orphan = {
            let blockchain = foreign.blockchain();
            let blockchain = blockchain.read().unwrap();
            mine_on(&blockchain, BTreeMap::new(), &keypair)
        };

        assert!(matches!(
            receive_block(&core, &orphan),
            BlockReceipt::NeedsParent(_)
        ));
    }

    #[test]
    fn reconcile_adopts_longer_chains_and_strips_their_operations() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());
        mine_noops(&core, &keypair, 2);

        // A neighbor is five blocks ahead and has committed an operation we
        // still hold as pending
        let neighbor = InkMinerCore::new(settings(), KeyPair::generate());
        mine_noops(&neighbor, &keypair, 3);
        let op = create_record(&keypair, "M 130 20 L 160 20", 30);
        assert!(receive_operation(&core, op.clone()));
        let op_block = {
            let blockchain = neighbor.blockchain();
            let blockchain = blockchain.read().unwrap();
            let ops = [(op.get_hash(), op.clone())].into_iter().collect();
            mine_on(&blockchain, ops, &keypair)
        };
        assert!(matches!(
            receive_block(&neighbor, &op_block),
            BlockReceipt::Accepted(_)
        ));
        mine_noops(&neighbor, &keypair, 1);

        let neighbor_chain = neighbor.blockchain().read().unwrap().chain().clone();
        assert!(reconcile(&core, vec![neighbor_chain]));

        let blockchain = core.blockchain();
        let blockchain = blockchain.read().unwrap();
        assert_eq!(blockchain.tip_num(), 5);
        assert!(!core.oppool().read().unwrap().has_op(&op.get_hash()));
    }

    #[test]
    fn reconcile_keeps_the_local_chain_when_it_wins() {
        let keypair = KeyPair::generate();
        let core = core(KeyPair::generate());
        mine_noops(&core, &keypair, 4);
        let local_tip = core.blockchain().read().unwrap().tip_hash();

        let neighbor = InkMinerCore::new(settings(), KeyPair::generate());
        mine_noops(&neighbor, &keypair, 2);
        let neighbor_chain = neighbor.blockchain().read().unwrap().chain().clone();

        assert!(!reconcile(&core, vec![neighbor_chain]));
        assert_eq!(core.blockchain().read().unwrap().tip_hash(), local_tip);
    }
}
