//! The `easel credits` command for the account balance.

use clap::Args;
use easel_core::{Config, CreditsClient};
use std::time::Duration;

/// Arguments for the `credits` command.
#[derive(Args, Debug)]
pub struct CreditsArgs {
    /// Keep polling on the configured interval and print every update
    #[arg(long)]
    pub watch: bool,

    /// API base URL override
    #[arg(long)]
    pub base_url: Option<String>,

    /// API key override
    #[arg(long, env = "EASEL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Execute the credits command.
pub async fn execute(args: CreditsArgs, config: Config) -> anyhow::Result<()> {
    let base_url = args
        .base_url
        .unwrap_or_else(|| config.api.base_url.clone());
    if base_url.trim().is_empty() {
        anyhow::bail!("No API base URL configured. Set [api].base_url or pass --base-url.");
    }
    let Some(api_key) = args.api_key.or_else(|| config.api_key()) else {
        anyhow::bail!("No API key configured. Run `easel config set-key` or pass --api-key.");
    };

    let client = CreditsClient::new(&base_url, &api_key);

    if args.watch {
        let interval = Duration::from_secs(config.credits.poll_interval_secs);
        let (mut balance, _poller) = client.spawn_poller(interval);
        // Runs until interrupted; fetch failures are logged by the poller
        // and polling continues.
        while balance.changed().await.is_ok() {
            if let Some(credits) = *balance.borrow() {
                println!("{credits}");
            }
        }
    } else {
        let credits = client.fetch().await?;
        println!("{credits}");
    }

    Ok(())
}
