//! Art-node operation flows
//!
//! These run on behalf of the co-located art application holding the
//! miner's private key. Submissions are validated as though appended to the
//! current tip, with the pending pool taken into account, so requests that
//! are already doomed never reach the network

use std::convert::TryFrom;

use common::{CanvasSettings, OpRecord};
use crypto::{Hash128, KeyPair};

use crate::InkMinerCore;

/// Error kinds surfaced to art nodes
///
/// The display form is the wire error name; everything internal stays in
/// `blockchain::Error` and is never returned to a client
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ArtError {
    /// The offered private key is not the miner's key
    #[error("INVALIDPRIVKEY")]
    InvalidPrivKey,

    /// The author cannot afford the requested shape
    #[error("INSUFFICIENTINK")]
    InsufficientInk,

    /// The shape overlaps a shape from another author
    #[error("SHAPEOVERLAP")]
    ShapeOverlap,

    /// The shape leaves the canvas
    #[error("OUTOFBOUNDS")]
    OutOfBounds,

    /// No live shape is stored under the given hash
    #[error("INVALIDSHAPEHASH")]
    InvalidShapeHash,

    /// No block is stored under the given hash
    #[error("INVALIDBLOCKHASH")]
    InvalidBlockHash,

    /// The shape belongs to a different author
    #[error("SHAPEOWNER")]
    ShapeOwner,

    /// Anything else worth telling the client about
    #[error("MISC: {0}")]
    Misc(String),
}

/// A successfully submitted create, before its confirmation wait
#[derive(Debug, PartialEq)]
pub struct SubmittedShape {
    /// The op-hash identifying the shape from now on
    pub shape_hash: Hash128,
    /// The ink the shape will cost once committed
    pub ink_required: u32,
}

/// Hands the canvas settings to an art node that can prove it holds the
/// miner's private key
pub fn open_canvas(core: &InkMinerCore, priv_key_hex: &str) -> Result<CanvasSettings, ArtError> {
    let offered = KeyPair::try_from(priv_key_hex).map_err(|_| ArtError::InvalidPrivKey)?;
    if offered.secret_key.to_bytes() != core.keypair().secret_key.to_bytes() {
        return Err(ArtError::InvalidPrivKey);
    }
    Ok(core.settings().canvas_settings)
}

/// Validates, signs and enqueues a create operation
///
/// The overlap check sees both committed shapes and pending creates from
/// other authors; the ink check charges the author's pending debits and
/// refunds against the balance at the tip
pub fn submit_add_shape(
    core: &InkMinerCore,
    svg: &str,
    fill: &str,
    stroke: &str,
) -> Result<SubmittedShape, ArtError> {
    let polyline =
        geometry::path_to_polyline(svg).map_err(|err| ArtError::Misc(err.to_string()))?;

    let canvas = core.settings().canvas_settings;
    if geometry::out_of_bounds(&polyline, canvas.canvas_x_max, canvas.canvas_y_max) {
        return Err(ArtError::OutOfBounds);
    }

    let transparent = fill == "transparent";
    let ink_required = geometry::ink_required(&polyline, transparent, polyline.closed);

    let key = core.public_key();
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();
    let oppool = core.oppool();

    {
        let oppool = oppool.read().unwrap();

        let committed = blockchain.visible_shapes(&key).into_iter();
        let pending = oppool
            .ops_by_others(&key)
            .filter(|op| !op.is_delete())
            .filter_map(|op| op.path_d().map(str::to_string));
        for path in committed.chain(pending) {
            if let Ok(other) = geometry::path_to_polyline(&path) {
                if geometry::overlaps(&polyline, &other) {
                    return Err(ArtError::ShapeOverlap);
                }
            }
        }

        let mut available = blockchain.ink_balance(&key);
        for op in oppool.ops_by_author(&key) {
            if op.is_delete() {
                available += i64::from(op.ink_used);
            } else {
                available -= i64::from(op.ink_used);
            }
        }
        if i64::from(ink_required) > available {
            return Err(ArtError::InsufficientInk);
        }
    }

    let op = OpRecord::signed(
        geometry::svg_path_string(svg, stroke, fill),
        ink_required,
        core.keypair(),
    );
    let shape_hash = oppool.write().unwrap().add_op(op);
    Ok(SubmittedShape {
        shape_hash,
        ink_required,
    })
}

/// Validates, signs and enqueues a delete operation for an owned shape
///
/// The deletion text is `delete ` plus the original create's full fragment
/// and refunds the create's ink
pub fn submit_delete_shape(core: &InkMinerCore, shape_hash: &Hash128) -> Result<Hash128, ArtError> {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();

    let (target, _) = blockchain
        .find_op(shape_hash)
        .ok_or(ArtError::InvalidShapeHash)?;
    if target.is_delete() {
        return Err(ArtError::InvalidShapeHash);
    }
    if target.author_pub_key != core.public_key() {
        return Err(ArtError::ShapeOwner);
    }
    if !blockchain.create_is_live(shape_hash) {
        return Err(ArtError::InvalidShapeHash);
    }

    let op = OpRecord::signed(
        format!("delete {}", target.op),
        target.ink_used,
        core.keypair(),
    );
    Ok(core.oppool().write().unwrap().add_op(op))
}

/// The miner's ink balance at the tip, floored at zero for reporting
pub fn get_ink(core: &InkMinerCore) -> u32 {
    let ink = core
        .blockchain()
        .read()
        .unwrap()
        .ink_balance(&core.public_key());
    debug_assert!(ink >= 0, "negative ink balance behind a validated tip");
    ink.max(0) as u32
}

/// The full operation text of the shape stored under `shape_hash`
pub fn get_svg_string(core: &InkMinerCore, shape_hash: &Hash128) -> Result<String, ArtError> {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();
    blockchain
        .find_op(shape_hash)
        .map(|(op, _)| op.op.clone())
        .ok_or(ArtError::InvalidShapeHash)
}

/// The operation texts committed by the block stored under `block_hash`
pub fn get_shapes(core: &InkMinerCore, block_hash: &Hash128) -> Result<Vec<String>, ArtError> {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();
    blockchain
        .get_block(block_hash)
        .map(|block| block.op_records.values().map(|op| op.op.clone()).collect())
        .ok_or(ArtError::InvalidBlockHash)
}

/// The hash every traversal terminates at
pub fn get_genesis_block(core: &InkMinerCore) -> Hash128 {
    core.settings().genesis_block_hash
}

/// Hashes of the stored blocks whose parent is `block_hash`
pub fn get_children(core: &InkMinerCore, block_hash: &Hash128) -> Result<Vec<Hash128>, ArtError> {
    let blockchain = core.blockchain();
    let blockchain = blockchain.read().unwrap();
    blockchain
        .children(block_hash)
        .ok_or(ArtError::InvalidBlockHash)
}
