//! deskpin daemon entry point.
//!
//! Spawns the native bridge, speaks the host protocol on stdin/stdout and
//! runs the workspace until either side goes away. Logs go to stderr.

mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use deskpin_common::DeskpinError;
use deskpin_config::DeskpinConfig;
use deskpin_native::{spawn_bridge, transport, BridgeProcess, NativeClient};
use deskpin_workspace::{forward_events, RemoteHost, Workspace};
use tokio::sync::mpsc;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_logging(directive: &str) {
    let filter = EnvFilter::from_default_env();
    let filter = match directive.parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(e) => {
            eprintln!("deskpin: invalid log level {directive:?} ({e}), using info");
            filter.add_directive(LevelFilter::INFO.into())
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = cli::parse();

    // Logging needs the configured level, so the outcome is reported later.
    let loaded = deskpin_config::load_config(args.config.as_deref());
    let directive = args.log_level.clone().unwrap_or_else(|| {
        loaded
            .as_ref()
            .map(|config| config.logging.level)
            .unwrap_or_default()
            .as_directive()
            .to_string()
    });
    init_logging(&directive);

    tracing::info!("deskpin v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &args.config {
        tracing::info!("Using config override: {}", path.display());
    }
    let mut config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        DeskpinConfig::default()
    });
    if let Some(command) = args.native_command {
        config.native.command = command;
    }

    if args.print_config {
        println!("{}", deskpin_config::config_to_json(&config));
        return ExitCode::SUCCESS;
    }

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: DeskpinConfig) -> Result<(), DeskpinError> {
    let BridgeProcess {
        mut child,
        stdin,
        stdout,
    } = spawn_bridge(&config.native.command, &config.native.args)?;
    let (native_channel, native_io) = transport::connect(stdout, stdin, config.native.framing);
    let native = NativeClient::new(native_channel);

    let (host_channel, mut host_io) = transport::connect(
        tokio::io::stdin(),
        tokio::io::stdout(),
        config.host.framing,
    );
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    forward_events(&host_channel, events_tx);
    let host = Arc::new(RemoteHost::new(host_channel));

    let workspace = Workspace::connect(native, host, config.workspace).await?;
    tracing::info!(windows = workspace.window_count(), "Workspace ready");

    tokio::select! {
        _ = workspace.run(events_rx) => {}
        _ = &mut host_io.reader => tracing::info!("Host disconnected"),
        status = child.wait() => match status {
            Ok(status) => tracing::warn!(%status, "Native bridge exited"),
            Err(e) => tracing::warn!(error = %e, "Lost track of native bridge"),
        },
    }
    native_io.abort();
    host_io.abort();
    Ok(())
}
