//! API client subcommands.

mod auth;
mod clear;
mod renew;
mod status;
mod token;

use anyhow::Result;
use clap::{Args, Subcommand};

use crate::context::Context;

#[derive(Args, Debug)]
pub struct ClientCommand {
    #[command(subcommand)]
    pub command: ClientSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ClientSubcommand {
    /// Authenticate an API client and store its access token
    Auth(auth::AuthArgs),

    /// Obtain a fresh token with the stored auto-renewal credential
    Renew(renew::RenewArgs),

    /// Print the current access token
    Token(token::TokenArgs),

    /// Display the stored session
    Status(status::StatusArgs),

    /// Forget the authenticated client and its token
    Clear(clear::ClearArgs),
}

pub async fn handle(cmd: ClientCommand, ctx: &Context) -> Result<()> {
    match cmd.command {
        ClientSubcommand::Auth(args) => auth::run(args, ctx).await,
        ClientSubcommand::Renew(args) => renew::run(args, ctx).await,
        ClientSubcommand::Token(args) => token::run(args, ctx).await,
        ClientSubcommand::Status(args) => status::run(args, ctx).await,
        ClientSubcommand::Clear(args) => clear::run(args, ctx).await,
    }
}
