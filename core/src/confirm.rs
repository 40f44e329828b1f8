//! N-confirmation waits
//!
//! A submitted operation is only reported back to the art node once its
//! containing block sits at least `validate_num` blocks below the tip. An
//! operation that leaves the pending pool without ever reaching the tip's
//! ancestry was orphaned by fork resolution, and the waiter is told so

use std::time::Duration;

use crypto::Hash128;
use tokio::time::Instant;

use crate::art::ArtError;
use crate::InkMinerCore;

/// How often a wait re-reads the chain
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

enum Poll {
    Confirmed(Hash128),
    Orphaned,
    Pending,
}

fn poll(core: &InkMinerCore, op_hash: &Hash128, validate_num: u8) -> Poll {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();

    if let Some((op, block_hash, depth)) = blockchain.op_confirmations(op_hash) {
        if op.author_pub_key == core.public_key() && depth >= u32::from(validate_num) {
            return Poll::Confirmed(block_hash);
        }
        return Poll::Pending;
    }

    let oppool = core.oppool();
    let oppool = oppool.read().unwrap();
    if oppool.has_op(op_hash) {
        Poll::Pending
    } else {
        // Left the pool without entering the ancestry: lost to a fork
        Poll::Orphaned
    }
}

/// Blocks until the operation is confirmed `validate_num` deep, orphaned, or
/// the deadline passes
///
/// Returns the hash of the containing block on success. Expiry is reported
/// as the orphan failure: the operation may still land later, but the
/// caller was promised an answer within its deadline
pub async fn await_confirmation(
    core: &InkMinerCore,
    op_hash: Hash128,
    validate_num: u8,
    deadline: Duration,
) -> Result<Hash128, ArtError> {
    let expires = Instant::now() + deadline;
    loop {
        match poll(core, &op_hash, validate_num) {
            Poll::Confirmed(block_hash) => return Ok(block_hash),
            Poll::Orphaned => {
                return Err(ArtError::Misc(format!(
                    "operation {} was orphaned by fork resolution",
                    op_hash
                )))
            }
            Poll::Pending => {}
        }
        if Instant::now() >= expires {
            return Err(ArtError::Misc(format!(
                "operation {} was not confirmed before the deadline",
                op_hash
            )));
        }
        tokio::time::sleep(POLL_INTERVAL.min(deadline)).await;
    }
}

#[cfg(test)]
mod tests {
    use std::convert::TryFrom;

    use common::{CanvasSettings, GetHash, MinerNetSettings, OpRecord};
    use crypto::KeyPair;

    use crate::miner;

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

    fn submitted_op(core: &InkMinerCore) -> Hash128 {
        let op = OpRecord::signed(
            geometry::svg_path_string("M 130 20 L 160 20", "green", "transparent"),
            30,
            core.keypair(),
        );
        core.oppool().write().unwrap().add_op(op)
    }

    #[tokio::test]
    async fn confirms_once_the_operation_is_deep_enough() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        for _ in 0..3 {
            miner::mine_once(&core).unwrap();
        }

        let op_hash = submitted_op(&core);
        let op_block = miner::mine_once(&core).unwrap();
        assert!(op_block.op_records.contains_key(&op_hash));

        // Depth 0: confirmed immediately with validate_num = 0
        let confirmed = await_confirmation(&core, op_hash, 0, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(confirmed, op_block.get_hash());

        // Two more blocks give depth 2
        miner::mine_once(&core).unwrap();
        miner::mine_once(&core).unwrap();
        let confirmed = await_confirmation(&core, op_hash, 2, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(confirmed, op_block.get_hash());
    }

    #[tokio::test]
    async fn reports_orphaned_operations() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        let op_hash = submitted_op(&core);
        let op = core
            .oppool()
            .read()
            .unwrap()
            .get_op(&op_hash)
            .cloned()
            .unwrap();

        // Fork resolution strips the pool while the operation never reaches
        // the adopted ancestry
        core.oppool()
            .write()
            .unwrap()
            .remove_included(&common::Block {
                block_num: 1,
                prev_hash: settings().genesis_block_hash,
                op_records: [(op_hash, op)].into_iter().collect(),
                miner_pub_key: core.public_key(),
                nonce: 0,
            });

        let result = await_confirmation(&core, op_hash, 0, Duration::from_secs(5)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn a_pending_operation_waits_until_the_deadline() {
        let core = InkMinerCore::new(settings(), KeyPair::generate());
        for _ in 0..3 {
            miner::mine_once(&core).unwrap();
        }
        let op_hash = submitted_op(&core);

        // Nothing mines the operation, so the wait expires
        let result = await_confirmation(&core, op_hash, 0, Duration::from_millis(50)).await;
        assert!(result.is_err());
        assert!(core.oppool().read().unwrap().has_op(&op_hash));
    }
}
