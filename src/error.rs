use thiserror::Error;

/// Failures while driving the site and collecting pages.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// An expected control is missing: markup changed or the page never rendered it.
    #[error("element not found ({locator}): {details}")]
    ElementNotFound { locator: String, details: String },

    #[error("page did not become ready ({url}): {details}")]
    PageTimeout { url: String, details: String },

    /// The site reported no floorsheet for the date. Terminal, not retryable.
    #[error("no floorsheet published for {date}")]
    NoResults { date: String },

    #[error("no table matching `{selector}` on the page")]
    TableNotFound { selector: String },

    #[error("pagination did not finish within {max_pages} pages")]
    PaginationOverrun { max_pages: usize },

    #[error("invalid table selector `{selector}`: {details}")]
    InvalidSelector { selector: String, details: String },

    #[error("browser error: {0}")]
    Browser(String),
}

/// Failures while turning the consolidated grid into a typed table.
#[derive(Debug, Error, PartialEq)]
pub enum CleaningError {
    #[error("table has no rows")]
    EmptyTable,

    #[error("column `{0}` not found in header")]
    ColumnNotFound(String),

    #[error("row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("column `{column}` row {row}: `{value}` is not numeric")]
    Parse {
        column: String,
        row: usize,
        value: String,
    },
}
