//! Client status command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::json;

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the status as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatusArgs, ctx: &Context) -> Result<()> {
    let sessions = ctx.sessions(&ctx.http())?;
    let session = sessions.session().context("Failed to load session")?;

    if args.json {
        return output::json_pretty(&json!({
            "client_id": session.client_id,
            "authenticated": session.is_authenticated(),
            "auto_renew": session.auto_renew_enabled,
            "renewable": session.can_renew(),
            "authority": sessions.authority().as_str(),
            "store": sessions.store().path(),
        }));
    }

    output::field("Client", session.client_id.as_deref().unwrap_or("(none)"));
    output::field(
        "Token",
        if session.is_authenticated() { "present" } else { "absent" },
    );
    output::field(
        "Auto-renewal",
        match (session.auto_renew_enabled, session.can_renew()) {
            (true, true) => "enabled",
            (true, false) => "enabled (no stored credential)",
            (false, _) => "disabled",
        },
    );
    output::field("Account manager", sessions.authority().as_str());
    output::field("Store", &sessions.store().path().display().to_string());

    Ok(())
}
