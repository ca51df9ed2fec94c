use anyhow::{Context, Result};
use chrono::Local;
use floorsheet::{
    browser::ChromeSession,
    config::Config,
    run::{run, RunOutcome},
};
use tokio::time::Instant;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::load().context("loading configuration")?;
    let today = Local::now().date_naive();

    // ─── 3) run the blocking browser pipeline off the async runtime ──
    let start = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        run(&config, today, || ChromeSession::launch(&config.browser))
    })
    .await
    .context("scrape task panicked")??;

    match outcome {
        RunOutcome::MarketClosed(day) => {
            info!(?day, "stock market is closed today; execution terminated")
        }
        RunOutcome::NoResults(query) => info!(date = %query, "no data for the date; aborted"),
        RunOutcome::Written { path, rows } => {
            info!(path = %path.display(), rows, elapsed = ?start.elapsed(), "all done")
        }
    }
    Ok(())
}
