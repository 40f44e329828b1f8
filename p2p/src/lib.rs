//! Peer networking: the directory server client, the neighbor roster and
//! gossip fan-out

mod config;
mod directory;
mod roster;

/// Outbound gossip to neighbor miners
pub mod gossip;

pub use config::Config;
pub use directory::{DirectoryClient, MinerInfo};
pub use roster::{heartbeat_loop, maintain, Roster};
