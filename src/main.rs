mod cli;
use cli::{parse_cli_mode, run_agenda_mode, run_report_mode, run_slider_mode, usage, CliMode};

use fmc_portal::storage::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logging();

    let cli_mode = match parse_cli_mode() {
        Ok(mode) => mode,
        Err(err) => {
            eprintln!("Error: {}", err);
            println!("{}", usage());
            return Ok(());
        }
    };

    if cli_mode == CliMode::Help {
        println!("{}", usage());
        return Ok(());
    }

    let config = Config::load_or_create()?.with_env_overrides();
    tracing::info!("Using backend at {}", config.api.base_url);

    let result = match cli_mode {
        CliMode::Agenda { package } => run_agenda_mode(&config, package.as_deref()).await,
        CliMode::Slider { package } => run_slider_mode(&config, package.as_deref()).await,
        CliMode::Report { output_dir } => run_report_mode(&config, output_dir).await,
        CliMode::Help => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

fn setup_logging() {
    let log_dir = Config::config_dir();

    std::fs::create_dir_all(&log_dir).ok();

    let file_appender = tracing_appender::rolling::daily(log_dir, "fmc-portal.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(false)
        .init();

    std::mem::forget(_guard);

    tracing::info!("fmc-portal started");
}
