//! Client renew command implementation.

use anyhow::{Context as _, Result};
use clap::Args;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct RenewArgs {}

pub async fn run(_args: RenewArgs, ctx: &Context) -> Result<()> {
    let sessions = ctx.sessions(&ctx.http())?;

    sessions.renew().await.context("Token renewal failed")?;

    output::success("Token renewal succeeded");
    Ok(())
}
