//! LCD Events - Binary Entry Point

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use lcd_events::hardware;
use lcd_events::producer::pump_lines;
use lcd_events::{Config, ConsoleDisplay, Dispatcher, LcdConsumer, WebsocketConsumer};

const STDIN_GRACE: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(name = "lcd-events", version, about = "Route status events to an LCD and a websocket dashboard")]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read `kind:payload` lines from stdin and route them to the consumers
    Serve {
        /// Don't drive the console display
        #[arg(long)]
        no_display: bool,

        /// Don't start the websocket dashboard
        #[arg(long)]
        no_websocket: bool,
    },
    /// Detect and display information about the host
    Detect,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Detect => detect(),
        Command::Serve {
            no_display,
            no_websocket,
        } => {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(e) => {
                    eprintln!("failed to start runtime: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let result = runtime.block_on(serve(cli.config, !no_display, !no_websocket));
            // The stdin reader may still be parked on a blocking thread
            runtime.shutdown_timeout(STDIN_GRACE);
            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!(error = %e, "lcd-events failed");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn detect() -> ExitCode {
    match hardware::detect() {
        Ok(info) => {
            println!("detected host {} (rev {:#x})", info.host, info.revision);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn serve(config_path: Option<PathBuf>, display: bool, websocket: bool) -> lcd_events::Result<()> {
    let config = Config::load(config_path.as_deref())?;
    let mut dispatcher = Dispatcher::new();

    let signal = dispatcher.signal().clone();
    if let Err(e) = ctrlc::set_handler(move || signal.fire()) {
        tracing::warn!(error = %e, "could not install Ctrl+C handler");
    }

    // Consumers already started must still be stopped when a later step fails
    let result = run(&mut dispatcher, &config, display, websocket).await;
    dispatcher.shutdown().await;
    result
}

async fn run(
    dispatcher: &mut Dispatcher,
    config: &Config,
    display: bool,
    websocket: bool,
) -> lcd_events::Result<()> {
    if display {
        let mut lcd = LcdConsumer::new(ConsoleDisplay::new(std::io::stdout()));
        dispatcher.register(&mut lcd, config).await?;
    }
    if websocket {
        let mut ws = WebsocketConsumer::new();
        dispatcher.register(&mut ws, config).await?;
    }

    tracing::info!(consumers = dispatcher.consumer_count(), "lcd-events ready");

    let stdin = BufReader::new(tokio::io::stdin());
    let dispatched = pump_lines(stdin, dispatcher).await?;
    tracing::info!(dispatched, "stdin closed, waiting for Ctrl+C");

    dispatcher.signal().fired().await;
    Ok(())
}
