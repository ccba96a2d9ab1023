//! Client auth command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use sfcc::{AuthSettings, ProjectConfig};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// API client id (falls back to dw.json)
    pub client_id: Option<String>,

    /// API client secret (falls back to dw.json)
    pub client_secret: Option<String>,

    /// Store the credentials so an expired token can be renewed
    #[arg(short = 'r', long)]
    pub renew: bool,
}

pub async fn run(args: AuthArgs, ctx: &Context) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read working directory")?;
    let project = ProjectConfig::load(&cwd)?;

    let settings = AuthSettings::resolve(
        args.client_id,
        args.client_secret,
        ctx.explicit_authority().cloned(),
        project.as_ref(),
    )?;

    if settings.from_project {
        output::note(&format!(
            "Using client credentials from dw.json at {}",
            cwd.display()
        ));
    }

    let http = ctx.http().with_invalid_certs(settings.accept_invalid_certs);
    let sessions = ctx.sessions(&http)?;

    // Renewal never reads dw.json, so it would use a different host or TLS policy.
    if args.renew && settings.from_project {
        if let Some(authority) = settings.authority.as_ref().filter(|a| *a != sessions.authority()) {
            output::warning(&format!(
                "dw.json selects account manager {authority}, but token renewal uses {}. \
                 Pass --account-manager {authority} to renew against the same host.",
                sessions.authority()
            ));
        }
        if settings.accept_invalid_certs {
            output::warning("dw.json allows self-signed certificates, but token renewal verifies TLS.");
        }
    }

    sessions
        .authenticate(
            settings.client_id.as_deref(),
            settings.client_secret.as_deref(),
            args.renew,
            settings.authority.as_ref(),
        )
        .await
        .context("Authentication failed")?;

    if args.renew {
        output::success("Authentication succeeded, token obtained successfully. Auto-renewal enabled.");
    } else {
        output::success("Authentication succeeded, token obtained successfully.");
    }

    Ok(())
}
