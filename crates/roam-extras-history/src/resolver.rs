use chrono::NaiveDate;
use roam_extras_config::YEARS_BACK;
use roam_extras_host::Graph;

use crate::date::{DateError, format_roam_date, parse_roam_date, years_before};

/// A daily-note page for the same calendar day in an earlier year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalPage {
    pub date: NaiveDate,
    pub title: String,
    pub uid: String,
}

/// Pages for `today` (a daily-note title) one to `years_back` years ago,
/// newest first. Years without a page are left out.
pub async fn resolve(
    graph: &dyn Graph,
    today: &str,
    years_back: u32,
) -> Result<Vec<HistoricalPage>, DateError> {
    let today = parse_roam_date(today)?;
    Ok(resolve_from(graph, today, years_back).await)
}

pub async fn resolve_from(graph: &dyn Graph, today: NaiveDate, years_back: u32) -> Vec<HistoricalPage> {
    let years_back = YEARS_BACK.clamp(i64::from(years_back));
    log::debug!("Looking up {years_back} years of pages for {today}");

    let mut pages = Vec::new();
    for years in 1..=years_back {
        let Some(date) = years_before(today, years) else {
            continue;
        };
        let title = format_roam_date(date);
        match graph.page_uid_by_title(&title).await {
            Ok(Some(uid)) => pages.push(HistoricalPage { date, title, uid }),
            Ok(None) => log::debug!("No page titled {title:?}"),
            Err(e) => log::error!("Could not look up page {title:?}: {e}"),
        }
    }
    pages
}
