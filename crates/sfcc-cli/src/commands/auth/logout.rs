//! Logout command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use sfcc::ClearPolicy;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, ctx: &Context) -> Result<()> {
    let sessions = ctx.sessions(&ctx.http())?;
    sessions
        .clear(ClearPolicy::EraseRenewal)
        .context("Failed to clear session")?;

    output::success("Logged out");
    Ok(())
}
