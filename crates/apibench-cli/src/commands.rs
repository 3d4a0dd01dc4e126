use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use apibench_core::prelude::*;
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "apibench", version, about = "Compare REST, GraphQL and gRPC-Web fetches")]
pub struct Cli {
    #[command(flatten)]
    pub endpoints: EndpointArgs,

    /// Log filter, e.g. `debug` or `apibench_core=trace` (overrides APIBENCH_LOG_LEVEL).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for `APIBENCH_*` environment settings.
#[derive(Debug, Args)]
pub struct EndpointArgs {
    #[arg(long, global = true)]
    pub rest_url: Option<String>,
    #[arg(long, global = true)]
    pub graphql_url: Option<String>,
    #[arg(long, global = true)]
    pub rpc_url: Option<String>,
    /// GraphQL schema dialect: `posts` or `legacy`.
    #[arg(long, global = true)]
    pub graphql_dialect: Option<String>,
    /// HTTP timeout in milliseconds (none by default).
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one service over one transport and print the report.
    Fetch(FetchArgs),
    /// Fetch every valid transport/service/size combination and print a summary.
    Matrix {
        /// Requests issued concurrently per combination.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// REST, GraphQL or gRPC-Web.
    #[arg(long, short)]
    pub transport: String,
    /// text, blog or media.
    #[arg(long, short)]
    pub service: String,
    /// small/medium/large for text, image/audio/video for media; ignored for blog.
    #[arg(long, short = 'z', default_value = "")]
    pub size: String,
    /// Issue this many identical requests concurrently.
    #[arg(long, short, default_value_t = 1)]
    pub count: usize,
    /// Write the media payload to this path (media only).
    #[arg(long)]
    pub save: Option<PathBuf>,
}

pub fn build_config(args: &EndpointArgs) -> Result<BenchConfig> {
    let mut config = BenchConfig::from_env()?;
    if let Some(url) = &args.rest_url {
        config = config.rest_base_url(url.clone());
    }
    if let Some(url) = &args.graphql_url {
        config = config.graphql_url(url.clone());
    }
    if let Some(url) = &args.rpc_url {
        config = config.rpc_base_url(url.clone());
    }
    if let Some(dialect) = &args.graphql_dialect {
        config = config.graphql_dialect(dialect.parse()?);
    }
    if let Some(ms) = args.timeout_ms {
        config = config.timeout((ms > 0).then(|| Duration::from_millis(ms)));
    }
    Ok(config)
}

pub async fn run(cli: Cli) -> Result<()> {
    let dispatcher = Dispatcher::from_config(build_config(&cli.endpoints)?)?;
    match cli.command {
        Command::Fetch(args) => fetch(&dispatcher, args).await,
        Command::Matrix { count } => matrix(&dispatcher, count).await,
    }
}

async fn fetch(dispatcher: &Dispatcher, args: FetchArgs) -> Result<()> {
    if args.count == 0 {
        bail!("--count must be at least 1");
    }
    println!(
        "Fetching {} ({}) via {}...",
        args.service, args.size, args.transport
    );
    let results = if args.count == 1 {
        vec![
            dispatcher
                .fetch_service(&args.transport, &args.service, &args.size)
                .await?,
        ]
    } else {
        dispatcher
            .fetch_service_parallel(&args.transport, &args.service, &args.size, args.count)
            .await?
    };

    for (idx, result) in results.into_iter().enumerate() {
        if args.count > 1 {
            println!("--- request {} ---", idx + 1);
        }
        println!("{}\n", result.report());
        if let Payload::Media(handle) = result.payload {
            match &args.save {
                Some(path) if idx == 0 => {
                    let written = save_media(handle, path)?;
                    println!("Saved {written} bytes to {}", path.display());
                }
                _ => {
                    let _ = handle.release();
                }
            }
        }
    }
    Ok(())
}

/// Writes the handle's bytes to `path` and releases it.
pub fn save_media(handle: MediaHandle, path: &Path) -> Result<usize> {
    let mime = handle.mime_type().to_string();
    let bytes = handle
        .release()
        .context("media handle was already released")?;
    std::fs::write(path, &bytes).with_context(|| format!("writing {}", path.display()))?;
    info!(event = "cli.media_saved", path = %path.display(), mime_type = %mime, bytes = bytes.len());
    Ok(bytes.len())
}

async fn matrix(dispatcher: &Dispatcher, count: usize) -> Result<()> {
    if count == 0 {
        bail!("--count must be at least 1");
    }
    println!(
        "{:<10} {:<6} {:<7} {:>12} {:>12}",
        "transport", "service", "size", "avg ms", "bytes"
    );
    for transport in TransportKind::ALL {
        for selector in Selector::all() {
            let spec = RequestSpec::from_selector(transport, selector);
            let size = spec.size.clone().unwrap_or_else(|| "-".to_string());
            let outcome = dispatcher
                .fetch_service_parallel(
                    transport.as_str(),
                    spec.service.as_str(),
                    spec.size.as_deref().unwrap_or(""),
                    count,
                )
                .await;
            match outcome {
                Ok(results) => println!(
                    "{:<10} {:<6} {:<7} {:>12.2} {:>12}",
                    transport.as_str(),
                    spec.service.as_str(),
                    size,
                    average_ms(&results),
                    results.first().map(|r| r.payload_bytes).unwrap_or(0)
                ),
                Err(err) => println!(
                    "{:<10} {:<6} {:<7} error: {err}",
                    transport.as_str(),
                    spec.service.as_str(),
                    size
                ),
            }
        }
    }
    Ok(())
}

pub fn average_ms(results: &[ResultEnvelope]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    results.iter().map(|r| r.elapsed_ms).sum::<f64>() / results.len() as f64
}
