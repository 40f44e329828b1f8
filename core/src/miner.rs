//! The single-writer mining loop
//!
//! Each iteration snapshots the tip and the pending pool, searches nonces
//! off-lock in bounded batches, and commits the found block in one critical
//! section together with the pool cleanup. A competing tip observed between
//! batches abandons the search and restarts on the new tip

use tokio::sync::mpsc::UnboundedSender;

use blockchain::InsertOutcome;
use common::{difficulty, Block, GetHash};
use crypto::Hash128;

use crate::InkMinerCore;

/// The nonce every search starts from
pub const FIRST_NONCE: u32 = 0;

/// Nonce attempts between tip checks, bounding work wasted on a stale parent
const NONCE_BATCH: u32 = 4096;

/// Candidate assembled from one snapshot of the shared state
struct Candidate {
    block: Block,
    num_zeros: u8,
}

fn snapshot(core: &InkMinerCore) -> Candidate {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();
    let oppool = core.oppool();
    let oppool = oppool.read().unwrap();

    let op_records = oppool.snapshot();
    let num_zeros = if op_records.is_empty() {
        core.settings().pow_difficulty_noop_block
    } else {
        core.settings().pow_difficulty_op_block
    };
    Candidate {
        block: Block {
            block_num: blockchain.tip_num() + 1,
            prev_hash: blockchain.tip_hash(),
            op_records,
            miner_pub_key: core.public_key(),
            nonce: FIRST_NONCE,
        },
        num_zeros,
    }
}

/// Advances the nonce up to `attempts` times, returning the block hash when
/// the proof-of-work difficulty is met
pub fn search_nonce(block: &mut Block, num_zeros: u8, attempts: u32) -> Option<Hash128> {
    for _ in 0..attempts {
        let block_hash = block.get_hash();
        if difficulty::verify_trailing_zeros(&block_hash, num_zeros) {
            return Some(block_hash);
        }
        block.nonce = block.nonce.wrapping_add(1);
    }
    None
}

/// Commits a mined block if the tip still equals its parent
///
/// Insertion and pool cleanup happen under the chain write lock in one
/// critical section; the broadcast happens after release via `mined_tx`
fn commit(core: &InkMinerCore, block: &Block) -> bool {
    let blockchain = core.blockchain();
    let mut blockchain = blockchain.write().unwrap();
    if blockchain.tip_hash() != block.prev_hash {
        return false;
    }

    match blockchain.insert(block.clone()) {
        InsertOutcome::Inserted(block_hash) => {
            core.oppool().write().unwrap().remove_included(block);
            log::info!(
                "Successfully mined block {} at height {} with nonce {}",
                block_hash,
                block.block_num,
                block.nonce
            );
            true
        }
        outcome => {
            log::warn!("Discarding a locally mined block: {:?}", outcome);
            false
        }
    }
}

/// Runs the mining loop forever, announcing committed blocks on `mined_tx`
pub async fn run(core: InkMinerCore, mined_tx: UnboundedSender<Block>) {
    loop {
        let Candidate {
            mut block,
            num_zeros,
        } = snapshot(&core);

        let mined = loop {
            if search_nonce(&mut block, num_zeros, NONCE_BATCH).is_some() {
                break true;
            }

            let tip_moved = {
                let blockchain = core.blockchain();
                let blockchain = blockchain.read().unwrap();
                blockchain.tip_hash() != block.prev_hash
            };
            if tip_moved {
                break false;
            }
            tokio::task::yield_now().await;
        };

        if mined && commit(&core, &block) && mined_tx.send(block).is_err() {
            // The broadcast side is gone; mining alone is pointless
            return;
        }
    }
}

/// Mines one block synchronously on the current tip, for flows that cannot
/// wait for the background loop
pub fn mine_once(core: &InkMinerCore) -> Option<Block> {
    let Candidate {
        mut block,
        num_zeros,
    } = snapshot(core);
    search_nonce(&mut block, num_zeros, u32::MAX)?;
    commit(core, &block).then_some(block)
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use common::{CanvasSettings, MinerNetSettings, OpRecord};
    use crypto::KeyPair;

    use super::*;

    fn settings() -> MinerNetSettings {
        MinerNetSettings {
            genesis_block_hash: Hash128::try_from("83218ac34c1834c26781fe4bde918ee4").unwrap(),
            min_num_miner_connections: 3,
            ink_per_op_block: 20,
            ink_per_noop_block: 10,
            heartbeat_ms: 2000,
            pow_difficulty_op_block: 2,
            pow_difficulty_noop_block: 2,
            canvas_settings: CanvasSettings {
                canvas_x_max: 200,
                canvas_y_max: 200,
            },
        }
    }

    #[test]
    fn mines_noop_blocks_that_credit_the_miner() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());

        for expected_height in 1..=3 {
            let block = mine_once(&core).unwrap();
            assert!(block.is_noop());
            assert_eq!(block.block_num, expected_height);
            assert!(difficulty::verify_trailing_zeros(&block.get_hash(), 2));
        }

        let blockchain = core.blockchain();
        let blockchain = blockchain.read().unwrap();
        assert_eq!(blockchain.tip_num(), 3);
        assert_eq!(blockchain.ink_balance(&core.public_key()), 30);
    }

    #[test]
    fn mined_op_blocks_empty_the_pool() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        // Fund the author before spending
        for _ in 0..3 {
            mine_once(&core).unwrap();
        }

        let op = OpRecord::signed(
            geometry::svg_path_string("M 130 20 L 160 20", "green", "transparent"),
            30,
            core.keypair(),
        );
        let op_hash = core.oppool().write().unwrap().add_op(op);

        let block = mine_once(&core).unwrap();
        assert!(!block.is_noop());
        assert!(block.op_records.contains_key(&op_hash));
        assert!(core.oppool().read().unwrap().is_empty());
    }

    #[test]
    fn search_stops_after_its_attempt_limit() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        let Candidate { mut block, .. } = snapshot(&core);
        // 32 zeros cannot be found in one attempt
        assert!(search_nonce(&mut block, 32, 1).is_none());
        assert_eq!(block.nonce, FIRST_NONCE + 1);
    }

    #[test]
    fn commit_refuses_a_stale_parent() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        let Candidate {
            mut block,
            num_zeros,
        } = snapshot(&core);
        search_nonce(&mut block, num_zeros, u32::MAX).unwrap();

        // Another writer advances the tip while we were searching
        mine_once(&core).unwrap();

        assert!(!commit(&core, &block));
        let blockchain = core.blockchain();
        let blockchain = blockchain.read().unwrap();
        assert_eq!(blockchain.tip_num(), 1);
    }
}
