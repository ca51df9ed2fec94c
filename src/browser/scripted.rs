//! In-memory [`Session`] that replays canned pages for tests.

use super::{Locator, Session};
use crate::error::ScrapeError;
use std::{cell::Cell, rc::Rc};

/// Serves `landing` until a click, then walks through `results` each time a
/// link is force-clicked. Link and text locators are matched against the
/// current markup; xpath/css locators always resolve unless listed in `missing`.
pub struct ScriptedSession {
    landing: String,
    results: Vec<String>,
    current: Option<usize>,
    pub missing: Vec<Locator>,
    pub calls: Vec<String>,
    closed: Rc<Cell<bool>>,
}

impl ScriptedSession {
    pub fn new(landing: &str, results: Vec<String>) -> Self {
        Self {
            landing: landing.to_string(),
            results,
            current: None,
            missing: Vec::new(),
            calls: Vec::new(),
            closed: Rc::new(Cell::new(false)),
        }
    }

    /// Flag flipped when the session is dropped.
    pub fn closed_flag(&self) -> Rc<Cell<bool>> {
        Rc::clone(&self.closed)
    }

    fn markup(&self) -> &str {
        match self.current {
            Some(i) => &self.results[i],
            None => &self.landing,
        }
    }

    fn resolves(&self, locator: &Locator) -> bool {
        if self.missing.contains(locator) {
            return false;
        }
        match locator {
            Locator::LinkText(t) => self.markup().contains(&format!(">{}</a>", t)),
            Locator::TextContains(t) => self.markup().contains(t.as_str()),
            _ => true,
        }
    }

    fn require(&self, locator: &Locator) -> Result<(), ScrapeError> {
        if self.resolves(locator) {
            Ok(())
        } else {
            Err(ScrapeError::ElementNotFound {
                locator: locator.to_string(),
                details: "not on scripted page".into(),
            })
        }
    }
}

impl Session for ScriptedSession {
    fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        self.calls.push(format!("goto {}", url));
        self.current = None;
        Ok(())
    }

    fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), ScrapeError> {
        self.require(locator)?;
        self.calls.push(format!("fill {} {}", locator, text));
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError> {
        self.require(locator)?;
        self.calls.push(format!("click {}", locator));
        if self.results.is_empty() {
            return Err(ScrapeError::PageTimeout {
                url: "scripted".into(),
                details: "no result pages scripted".into(),
            });
        }
        self.current = Some(0);
        Ok(())
    }

    fn is_present(&mut self, locator: &Locator) -> Result<bool, ScrapeError> {
        Ok(self.resolves(locator))
    }

    fn force_click(&mut self, locator: &Locator) -> Result<bool, ScrapeError> {
        if self.results.is_empty() || !self.resolves(locator) {
            return Ok(false);
        }
        self.calls.push(format!("force_click {}", locator));
        // a site that keeps offering "Next" on its last page loops there
        let next = self.current.map_or(0, |i| i + 1);
        self.current = Some(next.min(self.results.len() - 1));
        Ok(true)
    }

    fn page_source(&mut self) -> Result<String, ScrapeError> {
        Ok(self.markup().to_string())
    }
}

impl Drop for ScriptedSession {
    fn drop(&mut self) {
        self.closed.set(true);
    }
}

/// Render a results page: the floorsheet table, plus a "Next" link unless `last`.
pub fn results_page(rows: &[&[&str]], last: bool) -> String {
    let body: String = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let tag = if i == 0 { "th" } else { "td" };
            let cells: String = row
                .iter()
                .map(|c| format!("<{tag}>{c}</{tag}>"))
                .collect();
            format!("<tr>{}</tr>", cells)
        })
        .collect();
    let pager = if last {
        r#"<a href="javascript:void(0)">Previous</a>"#.to_string()
    } else {
        r#"<a href="javascript:void(0)">Previous</a> <a href="javascript:void(0)">Next</a>"#
            .to_string()
    };
    format!(
        r#"<html><body><form><table class="table table-bordered table-striped table-hover sortable">{}</table><div class="pager">{}</div></form></body></html>"#,
        body, pager
    )
}
