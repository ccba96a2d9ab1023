//! Session subcommands.

mod logout;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::context::Context;

#[derive(Args, Debug)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum AuthSubcommand {
    /// Remove every stored credential, including the auto-renewal one
    Logout(logout::LogoutArgs),
}

pub async fn handle(cmd: AuthCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        AuthSubcommand::Logout(args) => logout::run(args, ctx).await,
    }
}
