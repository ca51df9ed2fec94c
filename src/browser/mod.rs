//! Browser capability used by the navigator and paginator.
//!
//! Components never talk to Chrome directly: they ask a [`Session`] to act on
//! an element described by a [`Locator`]. The locators themselves live in the
//! run configuration, so a markup change on the site means editing the locator
//! table, not the control flow.

pub mod chrome;
#[cfg(test)]
pub(crate) mod scripted;

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use chrome::ChromeSession;

/// How to find one element on the current page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// Structural position, e.g. an absolute XPath.
    Xpath(String),
    Css(String),
    /// An `<a>` whose visible text equals the value.
    LinkText(String),
    /// Any element whose own text contains the value.
    TextContains(String),
    /// Any element carrying `name="value"`.
    Attribute { name: String, value: String },
}

/// Concrete lookup a session can hand to the DOM.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Css(String),
    Xpath(String),
}

impl Locator {
    pub fn target(&self) -> Target {
        match self {
            Locator::Xpath(x) => Target::Xpath(x.clone()),
            Locator::Css(c) => Target::Css(c.clone()),
            Locator::LinkText(t) => {
                Target::Xpath(format!("//a[normalize-space(.)={}]", xpath_literal(t)))
            }
            Locator::TextContains(t) => {
                Target::Xpath(format!("//*[contains(text(), {})]", xpath_literal(t)))
            }
            Locator::Attribute { name, value } => Target::Css(format!(
                "[{}={}]",
                name,
                serde_json::Value::from(value.as_str())
            )),
        }
    }

    /// JavaScript expression evaluating to the first matching node, or `null`.
    pub fn js_node(&self) -> String {
        match self.target() {
            Target::Css(sel) => format!(
                "document.querySelector({})",
                serde_json::Value::from(sel)
            ),
            Target::Xpath(xp) => format!(
                "document.evaluate({}, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue",
                serde_json::Value::from(xp)
            ),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Xpath(x) => write!(f, "xpath {}", x),
            Locator::Css(c) => write!(f, "css {}", c),
            Locator::LinkText(t) => write!(f, "link text {:?}", t),
            Locator::TextContains(t) => write!(f, "text containing {:?}", t),
            Locator::Attribute { name, value } => write!(f, "[{}={:?}]", name, value),
        }
    }
}

/// Quote `s` as an XPath 1.0 string literal. XPath has no escapes, so a value
/// holding both quote kinds is spliced together with `concat()`.
fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{}'", s)
    } else if !s.contains('"') {
        format!("\"{}\"", s)
    } else {
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{}'", p)).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// One exclusively owned browser tab. Dropping the session releases the browser.
pub trait Session {
    /// Load `url` and wait until the page is ready.
    fn goto(&mut self, url: &str) -> Result<(), ScrapeError>;

    /// Clear an input and type `text` into it.
    fn fill(&mut self, locator: &Locator, text: &str) -> Result<(), ScrapeError>;

    /// Click an element through normal input dispatch and wait until the page it
    /// was clicked on has been replaced.
    fn click(&mut self, locator: &Locator) -> Result<(), ScrapeError>;

    fn is_present(&mut self, locator: &Locator) -> Result<bool, ScrapeError>;

    /// Click from script, ignoring visibility and scroll position.
    /// Returns `false` without acting when nothing matches.
    fn force_click(&mut self, locator: &Locator) -> Result<bool, ScrapeError>;

    /// Markup of the page as currently rendered.
    fn page_source(&mut self) -> Result<String, ScrapeError>;
}
