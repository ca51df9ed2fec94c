use crate::{
    browser::Session,
    config::Site,
    error::ScrapeError,
    extract::{extract_table, TableSelector},
    navigator::submit_query,
    query::Query,
    Grid,
};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Search for `query`, then read every results page into one grid.
///
/// Rows are appended in page order, each page's header row included; dedup
/// is left to [`crate::clean::clean`]. Paging stops when the "next page"
/// control disappears. Seeing it on page `max_pages` is a `PaginationOverrun`.
pub fn scrape_all<S: Session + ?Sized>(
    session: &mut S,
    site: &Site,
    query: &Query,
    max_pages: usize,
) -> Result<Grid, ScrapeError> {
    let start = Instant::now();
    let table = TableSelector::parse(&site.table_selector)?;

    submit_query(session, site, query)?;

    let mut grid: Grid = Vec::new();
    let mut pages = 0usize;
    loop {
        let markup = session.page_source()?;
        let rows = extract_table(&markup, &table)?;
        pages += 1;
        debug!(page = pages, rows = rows.len(), "page extracted");
        grid.extend(rows);

        let next = &site.locators.next_page;
        if !session.is_present(next)? {
            break;
        }
        if pages >= max_pages {
            warn!(pages, "next page still offered at the page limit");
            return Err(ScrapeError::PaginationOverrun { max_pages });
        }
        if !session.force_click(next)? {
            // vanished between the check and the click
            break;
        }
    }

    info!(
        date = %query,
        pages,
        rows = grid.len(),
        elapsed = ?start.elapsed(),
        "scrape finished"
    );
    Ok(grid)
}
