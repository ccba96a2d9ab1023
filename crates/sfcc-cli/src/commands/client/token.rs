//! Client token command implementation.

use anyhow::Result;
use clap::Args;
use sfcc::error::AuthError;

use crate::context::Context;

#[derive(Args, Debug)]
pub struct TokenArgs {}

pub async fn run(_args: TokenArgs, ctx: &Context) -> Result<()> {
    let sessions = ctx.sessions(&ctx.http())?;
    let token = sessions.token()?.ok_or(AuthError::NotAuthenticated)?;

    println!("{}", token.as_str());
    Ok(())
}
