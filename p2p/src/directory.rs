use serde::Serialize;

use common::MinerNetSettings;
use crypto::PublicKey;
use jsonrpc_client::{Error, JsonRpcClient, Result};

/// Registration payload sent to the directory server
#[derive(Serialize, Debug)]
pub struct MinerInfo {
    /// Address other miners dial to reach this peer
    pub address: String,
    /// The registering miner's public key
    pub key: PublicKey,
}

/// Client for the bootstrap directory server (`RServer.*`)
///
/// The directory assigns neighbors, issues network settings and monitors
/// liveness; it is external to the core and only consumed here
pub struct DirectoryClient {
    client: JsonRpcClient,
    pub_key: PublicKey,
}

impl DirectoryClient {
    /// Builds a client for the directory at `address`
    pub fn new(address: &str, pub_key: PublicKey) -> Result<Self> {
        Ok(DirectoryClient {
            client: JsonRpcClient::new(address)?,
            pub_key,
        })
    }

    /// Registers this miner and returns the network settings
    ///
    /// No settings means no operation: callers treat failure here as fatal
    pub async fn register(&self, listen_address: &str) -> Result<MinerNetSettings> {
        let info = MinerInfo {
            address: listen_address.to_string(),
            key: self.pub_key,
        };
        self.client
            .call("RServer.Register", &info)
            .await?
            .ok_or(Error::EmptyResult)
    }

    /// Fetches the neighbor addresses assigned to this miner
    pub async fn get_nodes(&self) -> Result<Vec<String>> {
        Ok(self
            .client
            .call("RServer.GetNodes", &self.pub_key)
            .await?
            .unwrap_or_default())
    }

    /// Sends one liveness heartbeat
    pub async fn heart_beat(&self) -> Result<bool> {
        Ok(self
            .client
            .call("RServer.HeartBeat", &self.pub_key)
            .await?
            .unwrap_or(false))
    }
}
