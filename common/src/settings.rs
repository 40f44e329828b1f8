use serde::{Deserialize, Serialize};

use crypto::Hash128;

/// Canvas dimensions shared with art nodes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSettings {
    /// Exclusive upper bound of x coordinates
    pub canvas_x_max: u32,
    /// Exclusive upper bound of y coordinates
    pub canvas_y_max: u32,
}

/// Network settings issued by the directory server at registration
///
/// Every miner on a network receives the same settings; they parameterize
/// proof-of-work difficulty, ink rewards, and the canvas
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinerNetSettings {
    /// Hash that terminates tip-to-genesis traversal; the genesis block
    /// itself is never stored
    pub genesis_block_hash: Hash128,

    /// Minimum neighbor count the peer roster maintains
    pub min_num_miner_connections: u8,

    /// Ink credited to the miner of a block carrying operations
    pub ink_per_op_block: u32,

    /// Ink credited to the miner of an empty block
    pub ink_per_noop_block: u32,

    /// Directory heartbeat period in milliseconds
    pub heartbeat_ms: u64,

    /// Required trailing zero hex characters for blocks carrying operations
    pub pow_difficulty_op_block: u8,

    /// Required trailing zero hex characters for empty blocks
    pub pow_difficulty_noop_block: u8,

    /// The shared canvas dimensions
    pub canvas_settings: CanvasSettings,
}
