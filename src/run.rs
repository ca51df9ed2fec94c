use crate::{
    browser::Session,
    clean::clean,
    config::Config,
    error::ScrapeError,
    paginate::scrape_all,
    query::Query,
    sink::write_csv,
};
use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use std::path::PathBuf;
use tracing::{info, warn};

/// How a run ended, when it ended without an error.
#[derive(Debug, PartialEq)]
pub enum RunOutcome {
    /// Closed-market day; the browser was never started.
    MarketClosed(Weekday),
    /// The site has no floorsheet for the date; nothing was written.
    NoResults(Query),
    Written { path: PathBuf, rows: usize },
}

/// One daily run: gate on the weekday, scrape every page, clean, write.
///
/// `open_session` is only called on trading days. The session it returns is
/// owned here and dropped before this returns, on every path.
pub fn run<S, F>(config: &Config, today: NaiveDate, open_session: F) -> Result<RunOutcome>
where
    S: Session,
    F: FnOnce() -> Result<S, ScrapeError>,
{
    let query = Query::new(config.query_date.unwrap_or(today));
    if query.market_closed() {
        let day = query.date().weekday();
        info!(date = %query, ?day, "market closed; nothing to scrape");
        return Ok(RunOutcome::MarketClosed(day));
    }

    let grid = {
        let mut session = open_session().context("starting browser session")?;
        match scrape_all(&mut session, &config.site, &query, config.max_pages) {
            Ok(grid) => grid,
            Err(ScrapeError::NoResults { date }) => {
                warn!(%date, "no floorsheet found; aborting");
                return Ok(RunOutcome::NoResults(query));
            }
            Err(e) => return Err(e).with_context(|| format!("scraping floorsheet for {}", query)),
        }
    };

    let table = clean(grid).context("cleaning floorsheet")?;
    let rows = table.rows.len();
    let path = write_csv(&table, &config.output_dir, &query)?;
    Ok(RunOutcome::Written { path, rows })
}
