// src/config.rs

use crate::browser::Locator;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use url::Url;

const DEFAULT_CONFIG_FILE: &str = "floorsheet.yaml";

/// Everything that ties us to the floorsheet site's current markup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Site {
    pub url: String,
    /// CSS selector for the results table.
    pub table_selector: String,
    /// Text the site renders when a date has no trades.
    pub no_results_text: String,
    pub locators: Locators,
}

/// Each entry is a single-key map, e.g. `next_page: { link_text: Next }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locators {
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub date_input: Locator,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub search_button: Locator,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub next_page: Locator,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Explicit Chrome binary; `None` lets the driver find one.
    pub chrome_path: Option<PathBuf>,
    /// Upper bound for page loads and element waits.
    pub timeout_secs: u64,
    /// Polling interval while waiting for a click's postback to replace the page.
    pub poll_ms: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: Site,
    pub browser: BrowserConfig,
    pub output_dir: PathBuf,
    /// Give up with `PaginationOverrun` past this many result pages.
    pub max_pages: usize,
    /// Scrape this date instead of today.
    pub query_date: Option<NaiveDate>,
}

impl Default for Site {
    fn default() -> Self {
        Self {
            url: "https://merolagani.com/Floorsheet.aspx".into(),
            table_selector: "table.table.table-bordered.table-striped.table-hover.sortable".into(),
            no_results_text: "Could not find floorsheet matching the search criteria".into(),
            locators: Locators::default(),
        }
    }
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            date_input: Locator::Xpath(
                "/html/body/form/div[4]/div[4]/div/div/div[1]/div[4]/input".into(),
            ),
            search_button: Locator::Xpath(
                "/html/body/form/div[4]/div[4]/div/div/div[2]/a[1]".into(),
            ),
            next_page: Locator::LinkText("Next".into()),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            timeout_secs: 30,
            poll_ms: 250,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: Site::default(),
            browser: BrowserConfig::default(),
            output_dir: PathBuf::from("data"),
            max_pages: 1000,
            query_date: None,
        }
    }
}

impl Config {
    /// Defaults, then `FLOORSHEET_CONFIG` (or `floorsheet.yaml` if present), then env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match env::var("FLOORSHEET_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => {
                debug!("no config file; using defaults");
                Self::default()
            }
        };
        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: Config = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        info!(path = %path.display(), "loaded config");
        Ok(cfg)
    }

    /// Apply `FLOORSHEET_*` overrides looked up through `var`.
    pub fn apply_overrides<F>(&mut self, var: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var("FLOORSHEET_URL") {
            self.site.url = url;
        }
        if let Some(dir) = var("FLOORSHEET_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(n) = var("FLOORSHEET_MAX_PAGES") {
            self.max_pages = n
                .trim()
                .parse()
                .with_context(|| format!("FLOORSHEET_MAX_PAGES={:?}", n))?;
        }
        if let Some(d) = var("FLOORSHEET_DATE") {
            let date = NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
                .with_context(|| format!("FLOORSHEET_DATE={:?}, expected YYYY-MM-DD", d))?;
            self.query_date = Some(date);
        }
        if let Some(h) = var("FLOORSHEET_HEADLESS") {
            self.browser.headless = match h.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => bail!("FLOORSHEET_HEADLESS={:?} is not a boolean", other),
            };
        }
        if let Some(p) = var("FLOORSHEET_CHROME_PATH") {
            self.browser.chrome_path = Some(PathBuf::from(p));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.site.url).with_context(|| format!("site url {:?}", self.site.url))?;
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            r#"
output_dir: /tmp/sheets
max_pages: 50
site:
  locators:
    next_page:
      css: a.next
"#
        )
        .unwrap();

        let cfg = Config::from_file(tmp.path()).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from("/tmp/sheets"));
        assert_eq!(cfg.max_pages, 50);
        assert_eq!(cfg.site.locators.next_page, Locator::Css("a.next".into()));
        // untouched fields fall back to defaults
        assert_eq!(cfg.site.url, Site::default().url);
        assert_eq!(cfg.site.locators.date_input, Locators::default().date_input);
        assert!(cfg.browser.headless);
    }

    #[test]
    fn test_example_file_matches_defaults() {
        let cfg: Config = serde_yaml::from_str(include_str!("../floorsheet.example.yaml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FLOORSHEET_URL", "http://localhost:8080/Floorsheet.aspx"),
            ("FLOORSHEET_MAX_PAGES", " 7 "),
            ("FLOORSHEET_DATE", "2024-03-05"),
            ("FLOORSHEET_HEADLESS", "false"),
        ]
        .into_iter()
        .collect();

        let mut cfg = Config::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();
        cfg.validate().unwrap();

        assert_eq!(cfg.site.url, "http://localhost:8080/Floorsheet.aspx");
        assert_eq!(cfg.max_pages, 7);
        assert_eq!(cfg.query_date, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert!(!cfg.browser.headless);
    }

    #[test]
    fn test_bad_overrides_are_rejected() {
        let mut cfg = Config::default();
        assert!(cfg
            .apply_overrides(|k| (k == "FLOORSHEET_DATE").then(|| "03/05/2024".to_string()))
            .is_err());

        let mut cfg = Config::default();
        cfg.apply_overrides(|k| (k == "FLOORSHEET_URL").then(|| "not a url".to_string()))
            .unwrap();
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.apply_overrides(|k| (k == "FLOORSHEET_MAX_PAGES").then(|| "0".to_string()))
            .unwrap();
        assert!(cfg.validate().is_err());
    }
}
