use super::{Locator, Session, Target};
use crate::config::BrowserConfig;
use crate::error::ScrapeError;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::{
    ffi::OsStr,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, info};

const CHROME_ARGS: &[&str] = &["--disable-gpu", "--no-sandbox", "--disable-dev-shm-usage"];

/// Tags the current document and its tables before a click triggers a postback.
const MARK_STALE: &str = "document.documentElement.__floorsheetStale = true; \
     document.querySelectorAll('table').forEach(t => t.setAttribute('data-floorsheet-stale', ''));";

/// True once the tagged document was replaced (full postback) or a fresh table
/// was rendered into it (partial postback), and loading has finished.
const PAGE_REPLACED: &str = "document.readyState === 'complete' && \
     (document.documentElement.__floorsheetStale !== true || \
      Array.from(document.querySelectorAll('table')).some(t => !t.hasAttribute('data-floorsheet-stale')))";

/// Script that clicks the node behind `node_expr`, tagging the page first.
/// Evaluates to `false` when nothing matches.
fn click_script(node_expr: &str) -> String {
    format!(
        "(() => {{ const el = {}; if (!el) return false; {} el.click(); return true; }})()",
        node_expr, MARK_STALE
    )
}

/// Poll `done` every `interval` until it holds or `timeout` passes.
fn wait_until<F: FnMut() -> bool>(timeout: Duration, interval: Duration, mut done: F) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if done() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(interval);
    }
}

/// A headless Chrome process with one tab. The process is killed when this is dropped.
pub struct ChromeSession {
    tab: Arc<Tab>,
    timeout: Duration,
    poll: Duration,
    // drops after the tab
    _browser: Browser,
}

impl ChromeSession {
    pub fn launch(cfg: &BrowserConfig) -> Result<Self, ScrapeError> {
        let options = LaunchOptions::default_builder()
            .headless(cfg.headless)
            .sandbox(false)
            .path(cfg.chrome_path.clone())
            .args(CHROME_ARGS.iter().map(|a| OsStr::new(*a)).collect())
            .idle_browser_timeout(Duration::from_secs(cfg.timeout_secs.max(1) * 4))
            .build()
            .map_err(|e| ScrapeError::Browser(format!("launch options: {}", e)))?;

        let browser = Browser::new(options)
            .map_err(|e| ScrapeError::Browser(format!("starting chrome: {}", e)))?;
        let tab = browser
            .new_tab()
            .map_err(|e| ScrapeError::Browser(format!("opening tab: {}", e)))?;
        tab.set_default_timeout(Duration::from_secs(cfg.timeout_secs));

        info!(headless = cfg.headless, "browser session started");
        Ok(Self {
            tab,
            timeout: Duration::from_secs(cfg.timeout_secs),
            poll: Duration::from_millis(cfg.poll_ms.max(1)),
            _browser: browser,
        })
    }

    fn element(&self, locator: &Locator) -> Result<Element<'_>, ScrapeError> {
        let found = match locator.target() {
            Target::Css(sel) => self.tab.wait_for_element(&sel),
            Target::Xpath(xp) => self.tab.wait_for_xpath(&xp),
        };
        found.map_err(|e| ScrapeError::ElementNotFound {
            locator: locator.to_string(),
            details: e.to_string(),
        })
    }

    fn eval_bool(&self, script: &str) -> Result<bool, ScrapeError> {
        let obj = self
            .tab
            .evaluate(script, false)
            .map_err(|e| ScrapeError::Browser(format!("evaluating script: {}", e)))?;
        Ok(obj.value.and_then(|v| v.as_bool()).unwrap_or(false))
    }

    /// Block until the page tagged by [`MARK_STALE`] has been replaced.
    /// Evaluation errors while the old context is torn down count as "not yet".
    fn await_replacement(&self) -> Result<(), ScrapeError> {
        let replaced = wait_until(self.timeout, self.poll, || {
            matches!(self.eval_bool(PAGE_REPLACED), Ok(true))
        });
        if !replaced {
            return Err(ScrapeError::PageTimeout {
                url: self.tab.get_url(),
                details: format!("page not replaced within {:?} of the click", self.timeout),
            });
        }
        Ok(())
    }
}

impl Session for ChromeSession {
    fn goto(&mut self, url: &str) -> Result<(), ScrapeError> {
        debug!(url, "navigating");
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map(|_| ())
            .map_err(|e| ScrapeError::PageTimeout {
                url: url.to_string(),
                details: e.to_string(),
            })
    }

    fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), ScrapeError> {
        debug!(%locator, text, "filling");
        let el = self.element(locator)?;
        el.call_js_fn("function() { this.value = ''; }", vec![], false)
            .map_err(|e| ScrapeError::Browser(format!("clearing {}: {}", locator, e)))?;
        el.type_into(text)
            .map_err(|e| ScrapeError::Browser(format!("typing into {}: {}", locator, e)))?;
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError> {
        debug!(%locator, "clicking");
        let el = self.element(locator)?;
        self.tab
            .evaluate(MARK_STALE, false)
            .map_err(|e| ScrapeError::Browser(format!("tagging page: {}", e)))?;
        el.click()
            .map_err(|e| ScrapeError::Browser(format!("clicking {}: {}", locator, e)))?;
        self.await_replacement()
    }

    fn is_present(&mut self, locator: &Locator) -> Result<bool, ScrapeError> {
        self.eval_bool(&format!("({}) !== null", locator.js_node()))
    }

    fn force_click(&mut self, locator: &Locator) -> Result<bool, ScrapeError> {
        if !self.eval_bool(&click_script(&locator.js_node()))? {
            return Ok(false);
        }
        debug!(%locator, "clicked from script");
        self.await_replacement()?;
        Ok(true)
    }

    fn page_source(&mut self) -> Result<String, ScrapeError> {
        self.tab
            .get_content()
            .map_err(|e| ScrapeError::Browser(format!("reading page content: {}", e)))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        info!("closing browser session");
    }
}
