use color_eyre::eyre::{eyre, Result};
use odinflip::{amount::Amount, ledger::STARTING_BALANCE};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod client;
mod ui;

const DEFAULT_ASSETS_DIR: &str = "sounds";

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: odinflip [--assets-dir <path>] [--balance <btc>] [--muted] [--log-file <path>]\n\
         \n\
         Flags:\n\
           --assets-dir <path> Directory holding the sound clips (default {DEFAULT_ASSETS_DIR}/)\n\
           --balance <btc>     Starting demo balance (default {})\n\
           --muted             Start with all sound cues muted\n\
           --log-file <path>   Append tracing output to a file instead of discarding it",
        STARTING_BALANCE,
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<client::AppConfig> {
    let mut args = std::env::args().skip(1);
    let mut assets_dir: Option<PathBuf> = None;
    let mut balance: Option<Amount> = None;
    let mut muted = false;
    let mut log_file: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--assets-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--assets-dir requires a path argument"))?;
                if assets_dir.is_some() {
                    return Err(eyre!("--assets-dir may only be specified once"));
                }
                assets_dir = Some(PathBuf::from(dir));
            }
            "--balance" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--balance requires a BTC amount"))?;
                if balance.is_some() {
                    return Err(eyre!("--balance may only be specified once"));
                }
                let parsed = raw
                    .parse::<Amount>()
                    .map_err(|err| eyre!("invalid --balance {raw}: {err}"))?;
                balance = Some(parsed);
            }
            "--muted" => muted = true,
            "--log-file" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--log-file requires a path argument"))?;
                if log_file.is_some() {
                    return Err(eyre!("--log-file may only be specified once"));
                }
                log_file = Some(PathBuf::from(path));
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    Ok(client::AppConfig {
        assets_dir: assets_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
        starting_balance: balance.unwrap_or(STARTING_BALANCE),
        muted,
        log_file,
    })
}

/// File-only logging; writing to stdout would fight the TUI. With no
/// --log-file the subscriber stays uninstalled and tracing is a no-op.
fn init_tracing(
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(path) = log_file else {
        return Ok(None);
    };
    let dir = match path.parent() {
        Some(parent) if parent != Path::new("") => parent,
        _ => Path::new("."),
    };
    let file = path
        .file_name()
        .ok_or_else(|| eyre!("--log-file needs a file name: {}", path.display()))?;
    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|err| eyre!("failed to install tracing subscriber: {err}"))?;
    Ok(Some(guard))
}

// Everything cooperates on one task, so the single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = parse_cli_args()?;
    let _guard = init_tracing(config.log_file.as_deref())?;
    tracing::info!("starting odinflip demo");
    client::run_app(config).await
}
