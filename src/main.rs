//! extauth-bridge - ejabberd external auth program.
//!
//! To use in ejabberd, set in `ejabberd.yml`:
//!
//! ```yaml
//! auth_method: external
//! extauth_program: "/usr/local/bin/extauth-bridge https://id.example.com/auth -e user/info -l /var/log/ejabberd"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, info_span, warn, Instrument};

use extauth_bridge::config::{
    parse_header, BridgeConfig, HttpMethod, DEFAULT_BASE_URL, DEFAULT_ENDPOINT, DEFAULT_LOG_DIR,
};
use extauth_bridge::telemetry::{self, LogSink};
use extauth_bridge::Bridge;

#[derive(Parser, Debug)]
#[command(name = "extauth-bridge")]
#[command(about = "ejabberd authentication bridge to an HTTP identity service")]
struct Args {
    /// Base URL of the identity service
    #[arg(value_name = "URL", default_value = DEFAULT_BASE_URL)]
    url: String,

    /// Endpoint name relative to the base URL
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Log directory
    #[arg(short, long, default_value = DEFAULT_LOG_DIR)]
    log: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// HTTP method for API calls (GET, POST or PUT)
    #[arg(short, long, default_value = "GET")]
    method: HttpMethod,

    /// Request timeout in seconds (no timeout if unset)
    #[arg(short, long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Extra header for every API call, as "Name: Value" (repeatable)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    headers: Vec<String>,

    /// Exit when ejabberd closes stdin instead of answering "false"
    #[arg(long)]
    exit_on_eof: bool,
}

impl Args {
    fn to_config(&self) -> Result<BridgeConfig> {
        let mut builder = BridgeConfig::builder()
            .base_url(&self.url)
            .endpoint(&self.endpoint)
            .method(self.method)
            .timeout_opt(self.timeout.map(Duration::from_secs))
            .exit_on_eof(self.exit_on_eof);

        for line in &self.headers {
            let (name, value) = parse_header(line)?;
            builder = builder.header(name, value);
        }

        Ok(builder.build()?)
    }
}

/// Resolves on SIGINT, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Cannot listen for SIGTERM: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}

async fn serve(args: Args, sink: LogSink) -> Result<()> {
    if let LogSink::Stderr(e) = &sink {
        warn!("Cannot open log file in {}: {}", args.log.display(), e);
    }

    info!("Starting ejabberd auth bridge");
    info!("Using {} as base URL", args.url);
    info!("Using {} as endpoint", args.endpoint);
    info!("Using {} as HTTP method", args.method);
    info!("Running in {} mode", if args.debug { "debug" } else { "release" });

    let config = args.to_config()?;
    let bridge = Bridge::new(&config)?;
    let end = bridge.run_stdio(shutdown_signal()).await?;

    warn!("Terminating ejabberd auth bridge: {}", end);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let sink = telemetry::initialise(&args.log, args.debug).context("failed to set up logging")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;

    let span = info_span!("extauth", pid = std::process::id());
    let result = runtime.block_on(serve(args, sink).instrument(span));

    // A stdin read may still be parked on a blocking thread; do not join it.
    runtime.shutdown_background();
    result
}
