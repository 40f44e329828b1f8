use structopt::StructOpt;

/// RPC server configuration
#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    // RPC
    /// Port serving both the miner and the art-node surface
    #[structopt(long, default_value = "14250")]
    pub rpc_bind_port: u16,

    /// Upper bound in seconds on an N-confirmation wait
    #[structopt(long, default_value = "600")]
    pub confirm_timeout: u64,
}
