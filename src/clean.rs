use crate::{error::CleaningError, Grid};
use std::{collections::HashSet, fmt};
use tracing::debug;

/// Index column the site prepends to every row.
pub const INDEX_COLUMN: &str = "#";
/// Columns carrying grouped decimals such as `1,234.50`.
pub const NUMERIC_COLUMNS: [&str; 2] = ["Rate", "Amount"];

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            // whole numbers keep a ".0" so the column reads as decimal
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{:.1}", n)
            }
            Value::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Deduplicated floorsheet with named columns and typed price/amount cells.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

/// Drop exact duplicate rows, keeping the first occurrence and the original order.
pub fn dedup_rows(grid: Grid) -> Grid {
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(grid.len());
    grid.into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect()
}

/// Strip thousands separators and parse. A value with no digit at all is rejected,
/// which keeps `inf`/`NaN` spellings out.
pub fn parse_grouped(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    let cleaned = cleaned.trim();
    if !cleaned.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    cleaned.parse().ok()
}

/// Turn the consolidated grid into a [`CleanTable`].
///
/// The repeated per-page header rows collapse during dedup, leaving the first
/// row as the header. The `#` column is dropped and `Rate`/`Amount` become numbers.
pub fn clean(grid: Grid) -> Result<CleanTable, CleaningError> {
    let before = grid.len();
    let mut rows = dedup_rows(grid).into_iter();
    let header = rows.next().ok_or(CleaningError::EmptyTable)?;

    let find = |name: &str| {
        header
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CleaningError::ColumnNotFound(name.to_string()))
    };
    let index_col = find(INDEX_COLUMN)?;
    let numeric: Vec<usize> = NUMERIC_COLUMNS
        .iter()
        .map(|&n| find(n))
        .collect::<Result<_, _>>()?;

    let width = header.len();
    let headers: Vec<String> = header
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index_col)
        .map(|(_, h)| h.clone())
        .collect();

    let mut out = Vec::with_capacity(rows.len());
    for (n, row) in rows.enumerate() {
        // 1-based, counting the header as row 0
        let row_no = n + 1;
        if row.len() != width {
            return Err(CleaningError::RaggedRow {
                row: row_no,
                expected: width,
                found: row.len(),
            });
        }
        let mut typed = Vec::with_capacity(width - 1);
        for (i, cell) in row.into_iter().enumerate() {
            if i == index_col {
                continue;
            }
            if numeric.contains(&i) {
                let v = parse_grouped(&cell).ok_or_else(|| CleaningError::Parse {
                    column: header[i].clone(),
                    row: row_no,
                    value: cell.clone(),
                })?;
                typed.push(Value::Number(v));
            } else {
                typed.push(Value::Text(cell));
            }
        }
        out.push(typed);
    }

    debug!(raw = before, kept = out.len(), "cleaned table");
    Ok(CleanTable { headers, rows: out })
}
