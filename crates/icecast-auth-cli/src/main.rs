use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use eyre::WrapErr;
use icecast_auth::{AuthHandler, AuthRequest};
use icecast_auth_cli::Policy;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(about = "Answer an Icecast authentication callback on stdin/stdout")]
struct Args {
    /// TOML policy file. Without one every named user is declined.
    #[clap(short, long)]
    config: Option<PathBuf>,

    #[clap(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Give up if the request is not complete after this many seconds.
    #[clap(short, long, default_value_t = 10)]
    timeout_secs: u64,
}

fn init_logging(format: LogFormat) {
    // stdout carries the protocol
    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn redacted(request: &AuthRequest) -> eyre::Result<String> {
    let mut value = serde_json::to_value(request).context("serializing request")?;
    if let Some(pass) = value.get_mut("pass").filter(|pass| !pass.is_null()) {
        *pass = "<redacted>".into();
    }
    Ok(value.to_string())
}

async fn run(args: Args) -> eyre::Result<()> {
    let policy = match &args.config {
        Some(path) => Policy::load(path).context("loading policy")?,
        None => Policy::default(),
    };

    let mut handler = AuthHandler::stdio();
    let request = tokio::time::timeout(
        Duration::from_secs(args.timeout_secs),
        handler.connection(),
    )
    .await
    .map_err(|_| eyre::eyre!("no request received within {}s", args.timeout_secs))?
    .context("reading authentication request")?;
    tracing::debug!(request = %redacted(&request)?, "received authentication request");

    let response = policy.decide(&request);
    tracing::info!(
        mountpoint = ?request.mountpoint(),
        user = ?request.user(),
        ?response,
        "answering authentication request"
    );
    handler
        .writer()
        .send(response)
        .await
        .context("writing response")?;

    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    init_logging(args.log_format);
    tracing::debug!(?args, "parsed command line arguments");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("creating tokio runtime")?;
    let result = runtime.block_on(run(args));

    // a stdin read still in flight blocks a normal runtime drop
    runtime.shutdown_background();
    result
}
