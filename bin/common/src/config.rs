use std::path::PathBuf;

use structopt::StructOpt;

/// Configuration shared by every binary
#[derive(StructOpt, Debug)]
#[structopt(rename_all = "kebab-case")]
pub struct Config {
    /// Logging verbosity: 0 warnings, 1 info, 2 debug, 3 and up trace
    #[structopt(long, default_value = "1")]
    pub log_level: u8,

    /// Directory for the log file and other local state; a per-user
    /// default is chosen when unset
    #[structopt(long)]
    pub data_directory: Option<PathBuf>,
}
