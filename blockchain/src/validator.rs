//! Block validation
//!
//! A block commits atomically: every operation it carries must pass, or the
//! whole block is rejected

use std::collections::HashMap;

use common::{difficulty, Block, GetHash, MinerNetSettings};
use crypto::PublicKey;

use crate::error::{Error, Result};
use crate::store::BlockChain;
use crate::views;

/// Validates a received block against the current store
///
/// Checks, in order: duplication, parent resolution, block-number
/// continuity, proof-of-work at the difficulty selected by the block's
/// operation set, then per-operation legality against the ancestry of the
/// block's parent. The store itself is not modified
pub fn validate_block(
    chain: &BlockChain,
    settings: &MinerNetSettings,
    block: &Block,
) -> Result<()> {
    let block_hash = block.get_hash();
    if chain.contains(&block_hash) {
        return Err(Error::DuplicateBlock);
    }

    let parent_num = if block.prev_hash == settings.genesis_block_hash {
        0
    } else {
        chain
            .get(&block.prev_hash)
            .ok_or(Error::UnknownParent(block.prev_hash))?
            .block_num
    };
    if block.block_num != parent_num + 1 {
        return Err(Error::InvalidBlockNum {
            block_num: block.block_num,
            parent_num,
        });
    }

    let num_zeros = if block.is_noop() {
        settings.pow_difficulty_noop_block
    } else {
        settings.pow_difficulty_op_block
    };
    if !difficulty::verify_trailing_zeros(&block_hash, num_zeros) {
        return Err(Error::InvalidPow);
    }

    validate_ops(chain, settings, block)
}

/// Validates every operation of a block against the ancestry of its parent
///
/// Iteration runs in op-hash order so the ink simulation is deterministic
/// across peers. Overlap checks for creates consult the parent's ancestry
/// only, never the block's own siblings
fn validate_ops(chain: &BlockChain, settings: &MinerNetSettings, block: &Block) -> Result<()> {
    let canvas = settings.canvas_settings;
    let mut balances: HashMap<PublicKey, i64> = HashMap::new();

    for op in block.op_records.values() {
        if !op.verify_signature() {
            return Err(Error::InvalidSignature);
        }

        let path = op
            .path_d()
            .ok_or_else(|| Error::InvalidOp("missing path data".to_string()))?;
        let polyline =
            geometry::path_to_polyline(path).map_err(|err| Error::InvalidOp(err.to_string()))?;
        if geometry::out_of_bounds(&polyline, canvas.canvas_x_max, canvas.canvas_y_max) {
            return Err(Error::OpOutOfBounds);
        }

        if !op.is_delete() {
            let visible =
                views::visible_shapes(chain, block.prev_hash, settings, &op.author_pub_key);
            for other_path in visible {
                if let Ok(other) = geometry::path_to_polyline(&other_path) {
                    if geometry::overlaps(&polyline, &other) {
                        return Err(Error::OpOverlap);
                    }
                }
            }
        }

        let balance = balances.entry(op.author_pub_key).or_insert_with(|| {
            views::ink_balance(chain, block.prev_hash, settings, &op.author_pub_key)
        });
        if op.is_delete() {
            *balance += i64::from(op.ink_used);
        } else {
            if i64::from(op.ink_used) > *balance {
                return Err(Error::InsufficientInk);
            }
            *balance -= i64::from(op.ink_used);
        }
    }

    Ok(())
}
