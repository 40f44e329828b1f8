use crypto::Hash128;

/// Type alias for chain operations that may result in an error
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for block validation and chain maintenance
///
/// These are internal failure codes: gossiped items that trip them are
/// logged and silently dropped, never surfaced to art nodes
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Returned when a block is already present in the store
    #[error("Block is already present in the chain store")]
    DuplicateBlock,

    /// Returned when a block's parent is neither stored nor the genesis hash
    #[error("Block references unknown parent {0}")]
    UnknownParent(Hash128),

    /// Returned when a block's number does not follow its parent's
    #[error("Block number {block_num} does not follow parent block number {parent_num}")]
    InvalidBlockNum {
        /// The received block's number
        block_num: u32,
        /// The stored parent's number
        parent_num: u32,
    },

    /// Returned when a block hash misses its proof-of-work difficulty
    #[error("Block hash does not carry the required trailing zeros")]
    InvalidPow,

    /// Returned when an operation's signature does not verify
    #[error("Operation signature does not verify under its author key")]
    InvalidSignature,

    /// Returned when an operation's path cannot be parsed
    #[error("Operation carries an invalid path: {0}")]
    InvalidOp(String),

    /// Returned when an operation draws outside the canvas
    #[error("Operation draws out of the canvas bounds")]
    OpOutOfBounds,

    /// Returned when a create overlaps another author's live shape
    #[error("Operation overlaps a shape from another author")]
    OpOverlap,

    /// Returned when an operation would overdraw its author's ink
    #[error("Operation would drive its author's ink balance negative")]
    InsufficientInk,
}
