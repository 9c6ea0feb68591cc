//! Sidebar windows for historical pages.

use roam_extras_host::{HostError, Sidebar, SidebarWindow};

use crate::resolver::HistoricalPage;

/// Opens the sidebar and adds one outline window per page, oldest first,
/// so the most recent year ends up on top. Nothing happens for an empty
/// list. Returns how many windows were added.
pub async fn open_windows(sidebar: &dyn Sidebar, pages: &[HistoricalPage]) -> Result<usize, HostError> {
    if pages.is_empty() {
        log::info!("No historical pages to open");
        return Ok(0);
    }

    sidebar.open().await?;
    for page in pages.iter().rev() {
        sidebar
            .add_window(SidebarWindow::outline(&page.uid).with_title(&page.title))
            .await?;
    }
    log::info!("Opened {} historical pages", pages.len());
    Ok(pages.len())
}

pub async fn close_windows(sidebar: &dyn Sidebar, pages: &[HistoricalPage]) -> Result<usize, HostError> {
    for page in pages {
        sidebar.remove_window(SidebarWindow::outline(&page.uid)).await?;
    }
    log::info!("Closed {} historical pages", pages.len());
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use roam_extras_host::memory::MemorySidebar;

    fn page(year: i32) -> HistoricalPage {
        HistoricalPage {
            date: NaiveDate::from_ymd_opt(year, 11, 25).unwrap(),
            title: format!("November 25th, {year}"),
            uid: format!("uid-{year}"),
        }
    }

    #[tokio::test]
    async fn test_open_adds_oldest_first() {
        let sidebar = MemorySidebar::default();

        let opened = open_windows(&sidebar, &[page(2023), page(2021)]).await.unwrap();

        assert_eq!(opened, 2);
        assert!(sidebar.is_open());
        assert_eq!(
            sidebar.windows(),
            vec![
                SidebarWindow::outline("uid-2021").with_title("November 25th, 2021"),
                SidebarWindow::outline("uid-2023").with_title("November 25th, 2023"),
            ]
        );
    }

    #[tokio::test]
    async fn test_open_nothing_leaves_sidebar_closed() {
        let sidebar = MemorySidebar::default();

        assert_eq!(open_windows(&sidebar, &[]).await.unwrap(), 0);
        assert!(!sidebar.is_open());
    }

    #[tokio::test]
    async fn test_close_removes_matching_windows() {
        let sidebar = MemorySidebar::default();
        sidebar.add_window(SidebarWindow::outline("other")).await.unwrap();
        open_windows(&sidebar, &[page(2023)]).await.unwrap();

        close_windows(&sidebar, &[page(2023)]).await.unwrap();

        assert_eq!(sidebar.windows(), vec![SidebarWindow::outline("other")]);
    }
}
