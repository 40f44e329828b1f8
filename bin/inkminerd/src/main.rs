use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use log::{error, info};
use structopt::StructOpt;

use crypto::KeyPair;
use ink_core::{gossip, miner, InkMinerCore};
use p2p::{DirectoryClient, Roster};
use rpc::Peer;

mod config;
use config::Config;

#[tokio::main]
async fn main() {
    // Command line arguments
    let config = Config::from_args();

    // Logging
    bin_common::logger::init(&config.bin_common_config, "inkminerd")
        .expect("Failed to initialise logger");

    // Main
    if let Err(err) = run(config).await {
        error!("Unable to run ink miner! {:#}", err);
    }
    info!("Exiting");
}

async fn run(config: Config) -> anyhow::Result<()> {
    info!("inkminerd {}", env!("CARGO_PKG_VERSION"));

    let keypair =
        KeyPair::try_from(config.priv_key.as_str()).context("Could not parse the private key")?;

    // Register with the directory server; no settings means no operation
    let directory = Arc::new(
        DirectoryClient::new(&config.p2p_config.directory_address, keypair.public_key)
            .context("Could not build the directory client")?,
    );
    let listen_address = format!(
        "{}:{}",
        config.p2p_config.advertise_host, config.rpc_config.rpc_bind_port
    );
    let settings = directory
        .register(&listen_address)
        .await
        .context("Could not register with the directory server")?;
    info!(
        "Registered with the directory; genesis {}",
        settings.genesis_block_hash
    );

    let core = InkMinerCore::new(settings.clone(), keypair);
    let roster = Roster::new();
    roster.replace(
        directory
            .get_nodes()
            .await
            .context("Could not fetch the initial neighbor set")?,
    );

    // A late joiner syncs before mining on an empty chain
    let chains = p2p::gossip::fetch_blockchains(&roster).await;
    if gossip::reconcile(&core, chains) {
        let blockchain = core.blockchain();
        let blockchain = blockchain.read().unwrap();
        info!("Synced to height {} from the neighbors", blockchain.tip_num());
    }

    // Background tasks: directory heartbeats, roster maintenance, mining,
    // and the fan-out of locally mined blocks
    tokio::spawn(p2p::heartbeat_loop(directory.clone(), settings.heartbeat_ms));
    tokio::spawn(p2p::maintain(
        roster.clone(),
        directory,
        settings.min_num_miner_connections,
        settings.heartbeat_ms,
    ));

    let (mined_tx, mut mined_rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(miner::run(core.clone(), mined_tx));
    let fan_out_roster = roster.clone();
    tokio::spawn(async move {
        while let Some(block) = mined_rx.recv().await {
            p2p::gossip::disseminate_block(&fan_out_roster, &block).await;
        }
    });

    // Serve art nodes and neighbor miners until the process dies
    let peer = Arc::new(Peer {
        core,
        roster,
        confirm_deadline: Duration::from_secs(config.rpc_config.confirm_timeout),
    });
    rpc::run(&config.rpc_config, peer)
        .await
        .context("RPC server failed")?;
    Ok(())
}
