use crate::{browser::Locator, browser::Session, config::Site, error::ScrapeError, query::Query};
use tracing::{info, instrument};

/// Open the floorsheet page and search for `query`'s date.
///
/// Fails with `NoResults` when the site answers with its "no floorsheet"
/// message; callers should stop the run there without writing anything.
#[instrument(level = "info", skip(session, site, query), fields(date = %query))]
pub fn submit_query<S: Session + ?Sized>(
    session: &mut S,
    site: &Site,
    query: &Query,
) -> Result<(), ScrapeError> {
    session.goto(&site.url)?;

    let locators = &site.locators;
    session.fill(&locators.date_input, &query.as_form_value())?;
    session.click(&locators.search_button)?;

    let marker = Locator::TextContains(site.no_results_text.clone());
    if session.is_present(&marker)? {
        return Err(ScrapeError::NoResults {
            date: query.as_form_value(),
        });
    }

    info!("search completed");
    Ok(())
}
