use structopt::StructOpt;

/// Networking configuration
#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    /// Address of the bootstrap directory server
    #[structopt(long, default_value = "127.0.0.1:12345")]
    pub directory_address: String,

    /// Address neighbors should dial back, as registered with the directory
    #[structopt(long, default_value = "127.0.0.1")]
    pub advertise_host: String,
}
