//! OCAPI request command implementation.

use anyhow::{Context as _, Result};
use clap::Args;
use serde_json::Value;
use sfcc::ocapi::DEFAULT_OCAPI_VERSION;
use sfcc::{HostUrl, Method, OcapiClient};

use crate::context::Context;
use crate::output;

#[derive(Args, Debug)]
pub struct OcapiArgs {
    /// Instance host name (e.g., my-sandbox.demandware.net)
    pub instance: HostUrl,

    /// Data API resource path (e.g., jobs/my-job/executions)
    pub resource: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: Method,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// OCAPI version
    #[arg(long, default_value = DEFAULT_OCAPI_VERSION)]
    pub api_version: String,
}

pub async fn run(args: OcapiArgs, ctx: &Context) -> Result<()> {
    let body: Option<Value> = args
        .data
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Invalid JSON in --data")?;

    let http = ctx.http();
    let sessions = ctx.sessions(&http)?;
    let client = OcapiClient::new(&sessions, args.instance, &http)?.with_version(args.api_version);

    let before = sessions.token()?;
    let result = client.send(args.method, &args.resource, body.as_ref()).await;

    // A changed token means the request was renewed and retried.
    if sessions.token().ok().flatten() != before {
        output::note("Token renewal succeeded");
    }

    let response =
        result.with_context(|| format!("OCAPI request to {} failed", args.resource))?;
    output::json_pretty(&response.body)
}
