use crate::{error::ScrapeError, Grid};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{trace, warn};

static ROW: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").expect("selector should parse"));
static CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("selector should parse"));

/// A parsed table selector that remembers its source text for error messages.
#[derive(Debug, Clone)]
pub struct TableSelector {
    css: String,
    selector: Selector,
}

impl TableSelector {
    pub fn parse(css: &str) -> Result<Self, ScrapeError> {
        let selector = Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
            selector: css.to_string(),
            details: format!("{:?}", e),
        })?;
        Ok(Self {
            css: css.to_string(),
            selector,
        })
    }
}

/// Pull the first table matching `table` out of `markup` as a grid of cell text.
///
/// Every `<tr>` becomes a row and every `<th>`/`<td>` inside it a cell, header
/// rows included. Carriage returns and newlines are removed from cell text;
/// rows are not padded, so ragged markup yields ragged rows.
pub fn extract_table(markup: &str, table: &TableSelector) -> Result<Grid, ScrapeError> {
    let document = Html::parse_document(markup);
    let mut tables = document.select(&table.selector);

    let found = tables.next().ok_or_else(|| ScrapeError::TableNotFound {
        selector: table.css.clone(),
    })?;
    let extra = tables.count();
    if extra > 0 {
        warn!(extra, "more than one table matched; using the first");
    }

    let grid: Grid = found
        .select(&ROW)
        .map(|row| {
            row.select(&CELL)
                .map(|cell| {
                    cell.text()
                        .collect::<String>()
                        .replace(&['\r', '\n'][..], "")
                })
                .collect()
        })
        .collect();

    trace!(rows = grid.len(), "extracted table");
    Ok(grid)
}
