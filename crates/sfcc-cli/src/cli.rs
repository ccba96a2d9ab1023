//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sfcc::HostUrl;

use crate::commands::auth::AuthCommand;
use crate::commands::client::ClientCommand;
use crate::commands::ocapi::OcapiArgs;

/// Commerce Cloud CI client.
#[derive(Parser, Debug)]
#[command(name = "sfcc-ci")]
#[command(author, version = env!("SFCC_CI_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Session file (defaults to the per-user configuration directory)
    #[arg(long, env = "SFCC_CI_STORE", global = true)]
    pub store: Option<PathBuf>,

    /// Account manager host used for authentication and renewal
    #[arg(long, env = "SFCC_ACCOUNT_MANAGER", global = true)]
    pub account_manager: Option<HostUrl>,

    /// Network timeout in seconds
    #[arg(long, default_value_t = 30, global = true)]
    pub timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// API client authentication
    Client(ClientCommand),

    /// Session management
    Auth(AuthCommand),

    /// Send an authorized request to an instance's OCAPI data API
    Ocapi(OcapiArgs),
}
