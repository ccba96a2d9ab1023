//! Client clear command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use sfcc::ClearPolicy;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct ClearArgs {}

pub async fn run(_args: ClearArgs, ctx: &Context) -> Result<()> {
    let sessions = ctx.sessions(&ctx.http())?;
    sessions
        .clear(ClearPolicy::KeepRenewal)
        .context("Failed to clear session")?;

    output::success("Client authentication cleared");
    Ok(())
}
