//! Ledger views derived by tip-to-genesis traversal
//!
//! Nothing here is cached: every question about balances, the canvas, or an
//! operation's whereabouts is answered by walking parent links from the
//! requested starting hash down to the genesis hash

use std::collections::HashMap;

use common::{MinerNetSettings, OpRecord};
use crypto::{Hash128, PublicKey};

use crate::store::BlockChain;

/// Ink balance of `key` as of the block identified by `from`
///
/// Rewards accrue to the miner of each ancestor block, the NoOp or Op amount
/// chosen by whether the block carries operations; creates authored by `key`
/// debit their cost and deletes refund it. The result can be negative only
/// if validation failed to do its job
pub fn ink_balance(
    chain: &BlockChain,
    from: Hash128,
    settings: &MinerNetSettings,
    key: &PublicKey,
) -> i64 {
    let mut ink: i64 = 0;
    for (_, block) in chain.iter_to_genesis(from, settings.genesis_block_hash) {
        if block.miner_pub_key == *key {
            ink += if block.is_noop() {
                i64::from(settings.ink_per_noop_block)
            } else {
                i64::from(settings.ink_per_op_block)
            };
        }
        for op in block.op_records.values() {
            if op.author_pub_key == *key {
                if op.is_delete() {
                    ink += i64::from(op.ink_used);
                } else {
                    ink -= i64::from(op.ink_used);
                }
            }
        }
    }
    ink
}

/// Path data of every live shape visible to `key` as of `from`
///
/// Visible means created by some other author and not deleted by a later
/// operation. Shapes by `key` itself are excluded: self-overlap is permitted
/// within one author, only cross-author overlap is forbidden. A delete is
/// matched to a create by author and by the exact fragment it embeds, so
/// one author's deletion never hides another author's shape that happens to
/// share the same path data
pub fn visible_shapes(
    chain: &BlockChain,
    from: Hash128,
    settings: &MinerNetSettings,
    key: &PublicKey,
) -> Vec<String> {
    let mut shapes = Vec::new();
    // Deletes are seen before the creates they cancel because the walk runs
    // from the tip downwards
    let mut deleted: HashMap<(PublicKey, String), u32> = HashMap::new();

    for (_, block) in chain.iter_to_genesis(from, settings.genesis_block_hash) {
        for op in block.op_records.values() {
            if op.author_pub_key == *key {
                continue;
            }
            if let Some(target) = op.delete_target() {
                *deleted
                    .entry((op.author_pub_key, target.to_string()))
                    .or_insert(0) += 1;
            } else if let Some(path) = op.path_d() {
                match deleted.get_mut(&(op.author_pub_key, op.op.clone())) {
                    Some(count) if *count > 0 => *count -= 1,
                    _ => shapes.push(path.to_string()),
                }
            }
        }
    }
    shapes
}

/// Finds the operation stored under `op_hash` in the ancestry of `from`
///
/// Returns the record and the hash of its containing block; the first match
/// walking from the tip wins
pub fn find_op<'a>(
    chain: &'a BlockChain,
    from: Hash128,
    genesis_hash: Hash128,
    op_hash: &Hash128,
) -> Option<(&'a OpRecord, Hash128)> {
    chain
        .iter_to_genesis(from, genesis_hash)
        .find_map(|(block_hash, block)| {
            block.op_records.get(op_hash).map(|op| (op, block_hash))
        })
}

/// Whether the create stored under `op_hash` is still live at `from`
///
/// A delete cancels the most recent earlier create by the same author with
/// the same operation text. The target is identified by its own op-hash, so
/// deleting one of two textually identical shapes leaves the other live;
/// among byte-identical duplicates the one nearest the tip dies first. The
/// walk runs newest-first: deletes of the target's fragment accumulate,
/// matching creates nearer the tip consume them, and the target is live
/// only if no delete is left for it
pub fn create_is_live(
    chain: &BlockChain,
    from: Hash128,
    genesis_hash: Hash128,
    op_hash: &Hash128,
) -> bool {
    let (target, _) = match find_op(chain, from, genesis_hash, op_hash) {
        Some(found) => found,
        None => return false,
    };
    if target.is_delete() {
        return false;
    }

    let mut pending_deletes: u32 = 0;
    for (_, block) in chain.iter_to_genesis(from, genesis_hash) {
        for (record_hash, op) in &block.op_records {
            if op.author_pub_key != target.author_pub_key {
                continue;
            }
            if let Some(deleted_fragment) = op.delete_target() {
                if deleted_fragment == target.op {
                    pending_deletes += 1;
                }
            } else if op.op == target.op {
                if record_hash == op_hash {
                    return pending_deletes == 0;
                }
                if pending_deletes > 0 {
                    pending_deletes -= 1;
                }
            }
        }
    }
    false
}
