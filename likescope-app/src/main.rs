use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use likescope_common::init_logging;
use likescope_config::{DEFAULT_CONFIG_FILE, LikescopeConfig, LikescopeConfigLoader};
use likescope_dashboard::{AppState, DashboardServer};
use likescope_social::{
    BearerToken, CollectorOptions, DateWindow, EmbedClient, TwitterApi, fetch_tweets,
    model::parse_handles, resolve_accounts,
};
use std::sync::Arc;
use std::time::Duration;

mod cli;
mod render;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1) Load config (env wins); the default file is optional, an explicit one is not.
    let loader = LikescopeConfigLoader::new();
    let loader = match &cli.config {
        Some(path) => loader.with_file(path),
        None => loader.with_optional_file(DEFAULT_CONFIG_FILE),
    };
    let cfg: LikescopeConfig = loader.load().context("loading configuration")?;

    init_logging(cfg.logging.to_log_config())?;

    let token = BearerToken::resolve(cli.token.as_deref(), cfg.twitter.bearer_token());

    match cli.command {
        Command::Fetch {
            handles,
            start,
            end,
            format,
            strict,
        } => {
            let window = DateWindow::parse(&start, end.as_deref())?;
            let api = twitter_api(&cfg, token?)?;
            let collection = fetch_tweets(&api, &handles, &window, &collector(&cfg)).await?;

            for note in render::collection_notes(&collection) {
                eprintln!("{note}");
            }
            print!("{}", render::fetch_output(collection, format, strict)?);
        }
        Command::Accounts { handles } => {
            let api = twitter_api(&cfg, token?)?;
            let handles = parse_handles(&handles)?;
            let resolved = resolve_accounts(&api, &handles).await?;
            print!("{}", render::accounts_table(&resolved));
            for handle in resolved.missing() {
                eprintln!("{handle}: not found");
            }
        }
        Command::Embed { account, id } => {
            let embed = embed_client(&cfg)?.embed_post(&account, &id).await?;
            println!("{}", embed.html);
        }
        Command::Serve { host, port } => {
            let state = AppState {
                source: Arc::new(twitter_api(&cfg, token?)?),
                embeds: embed_client(&cfg)?,
                collector: collector(&cfg),
            };
            let host = host.unwrap_or_else(|| cfg.dashboard.host.clone());
            let port = port.unwrap_or(cfg.dashboard.port);
            DashboardServer::new(host, port, state).serve().await?;
        }
    }

    Ok(())
}

fn twitter_api(cfg: &LikescopeConfig, token: BearerToken) -> Result<TwitterApi> {
    Ok(TwitterApi::with_base(&cfg.twitter.api_base, token)?
        .with_timeout(Duration::from_secs(cfg.twitter.timeout_secs)))
}

fn embed_client(cfg: &LikescopeConfig) -> Result<EmbedClient> {
    Ok(EmbedClient::with_base(&cfg.twitter.publish_base)?
        .with_timeout(Duration::from_secs(cfg.twitter.timeout_secs)))
}

fn collector(cfg: &LikescopeConfig) -> CollectorOptions {
    CollectorOptions {
        concurrency: cfg.twitter.concurrency,
    }
}
