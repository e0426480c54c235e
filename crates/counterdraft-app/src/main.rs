// Counter-draft assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, stdout is the user interface)
// 2. Load config
// 3. Load counter and lane tables
// 4. Build the room sync context and AppState
// 5. Start the stdin reader and output printer
// 6. Run the command loop until `quit` or end of input

use std::io::BufRead;

use counterdraft_app::app;
use counterdraft_app::command::{self, Command};
use counterdraft_app::config;
use counterdraft_app::loader;
use counterdraft_app::sync::RoomSync;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Counterdraft starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: room={}, max_picks={}, counters={}, lanes={}",
        config.draft.room,
        config.draft.max_picks,
        config.data_paths.counters,
        config.data_paths.lanes
    );

    // 3. Load tables (missing files degrade to empty tables)
    let tables = loader::load_tables(&config.data_paths);
    if tables.dataset.is_empty() {
        eprintln!(
            "warning: no counter data loaded from {}; suggestions will be empty",
            config.data_paths.counters
        );
    }

    // 4. Build state
    let sync = RoomSync::from_config(&config);
    let state = app::AppState::new(&config, tables, sync);

    // 5. Channels and I/O tasks
    let (cmd_tx, cmd_rx) = mpsc::channel::<Command>(64);
    let (out_tx, mut out_rx) = mpsc::channel::<String>(64);

    // Stdin is read on a plain thread: a blocking read would otherwise keep
    // the runtime from shutting down after `quit`.
    let reader_out = out_tx.clone();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("failed to read stdin: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match command::parse_command(&line) {
                Ok(cmd) => {
                    if cmd_tx.blocking_send(cmd).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    if reader_out.blocking_send(format!("error: {e}")).is_err() {
                        break;
                    }
                }
            }
        }
        info!("stdin reader finished");
    });

    let printer = tokio::spawn(async move {
        while let Some(text) = out_rx.recv().await {
            println!("{text}\n");
        }
    });

    println!("{}\n", command::HELP);

    // 6. Run the command loop
    if let Err(e) = app::run(cmd_rx, out_tx, state).await {
        error!("Command loop error: {}", e);
        return Err(e.context("command loop failed"));
    }

    // The reader thread may still hold an output sender; flush what was
    // queued and exit without waiting for it.
    let _ = tokio::time::timeout(std::time::Duration::from_millis(200), printer).await;

    info!("Counterdraft shut down cleanly");
    Ok(())
}

const DEFAULT_LOG_FILTER: &str =
    "counterdraft=info,counterdraft_app=info,counterdraft_core=info,warn";

/// Initialize tracing to log to a file (stdout carries the draft output).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    // One log per run; the previous session's file is truncated.
    let log_file = std::fs::File::create(log_dir.join("counterdraft.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
