//! API definitions for the RPC server

use serde::{Deserialize, Serialize};

use crypto::Hash128;

/// Shape kinds an art node can submit
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeType {
    /// An SVG path built from `M L h v Z` commands
    #[serde(rename = "PATH")]
    Path,
}

// open_canvas
/// Proof of identity for a connecting art node
#[derive(Serialize, Deserialize, Debug)]
pub struct OpenCanvasRequest {
    /// Hex encoding of the miner's private key scalar
    pub priv_key: String,
}

// add_shape
/// Request to draw a new shape on the canvas
#[derive(Serialize, Deserialize, Debug)]
pub struct AddShapeRequest {
    /// Confirmations to await before answering
    pub validate_num: u8,

    /// Kind of shape being submitted
    pub shape_type: ShapeType,

    /// The path's `d` attribute, e.g. `M 0 0 L 20 20`
    pub svg_string: String,

    /// Fill color; `transparent` marks a non-filled shape
    pub fill: String,

    /// Stroke color
    pub stroke: String,
}

/// Response to a confirmed add_shape
#[derive(Serialize, Deserialize, Debug)]
pub struct NewShapeResponse {
    /// Hash identifying the shape from now on
    pub shape_hash: Hash128,

    /// Block that committed the shape
    pub block_hash: Hash128,

    /// The author's ink after the shape was charged
    pub ink_remaining: u32,
}

// delete_shape
/// Request to remove an owned shape from the canvas
#[derive(Serialize, Deserialize, Debug)]
pub struct DeleteShapeRequest {
    /// Confirmations to await before answering
    pub validate_num: u8,

    /// Hash of the create operation to undo
    pub shape_hash: Hash128,
}

// get_svg_string
/// Request for the full operation text of one shape
#[derive(Serialize, Deserialize, Debug)]
pub struct GetSvgStringRequest {
    /// Hash of the shape to look up
    pub shape_hash: Hash128,
}

// get_shapes / get_children
/// Request naming one block of the chain
#[derive(Serialize, Deserialize, Debug)]
pub struct BlockHashRequest {
    /// Hash of the block to inspect
    pub block_hash: Hash128,
}
