//! Outbound gossip: best-effort fan-out and chain fetches
//!
//! A neighbor that cannot be reached is logged and skipped; convergence
//! relies on chain reconciliation, not on delivery guarantees

use blockchain::BlockChain;
use common::{Block, OpRecord};
use jsonrpc_client::JsonRpcClient;

use crate::Roster;

async fn fan_out<P: serde::Serialize>(roster: &Roster, method: &str, payload: &P) {
    for address in roster.snapshot() {
        let client = match JsonRpcClient::new(&address) {
            Ok(client) => client,
            Err(err) => {
                log::warn!("Could not dial miner {}: {}", address, err);
                continue;
            }
        };
        if let Err(err) = client.call::<_, bool>(method, payload).await {
            log::warn!("Could not call {} on {}: {}", method, address, err);
        }
    }
}

/// Sends a fresh operation once to every current neighbor
pub async fn disseminate_operation(roster: &Roster, op: &OpRecord) {
    fan_out(roster, "MServer.DisseminateOperation", op).await;
}

/// Sends an accepted block once to every current neighbor
pub async fn disseminate_block(roster: &Roster, block: &Block) {
    fan_out(roster, "MServer.DisseminateBlock", block).await;
}

/// Fetches the full chain from every reachable neighbor
pub async fn fetch_blockchains(roster: &Roster) -> Vec<BlockChain> {
    let mut chains = Vec::new();
    for address in roster.snapshot() {
        let client = match JsonRpcClient::new(&address) {
            Ok(client) => client,
            Err(err) => {
                log::warn!("Could not dial miner {}: {}", address, err);
                continue;
            }
        };
        match client
            .call::<_, BlockChain>("MServer.GetBlockChain", &serde_json::json!(null))
            .await
        {
            Ok(Some(chain)) => chains.push(chain),
            Ok(None) => log::warn!("Miner {} returned an empty chain", address),
            Err(err) => log::warn!("Could not fetch the chain from {}: {}", address, err),
        }
    }
    chains
}
