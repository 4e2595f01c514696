use serde::Serialize;

const WINDOW: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

/// Pager over an estimated page count; the listing API reports no total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pager {
    pub current: u32,
    pub total: u32,
}

impl Pager {
    pub fn new(current: u32, total: u32) -> Self {
        let total = total.max(1);
        Self {
            current: current.clamp(1, total),
            total,
        }
    }

    pub fn clamp(&self, page: u32) -> u32 {
        page.clamp(1, self.total)
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total
    }

    /// Up to five consecutive pages around the current one, plus links to the
    /// first and last page with an ellipsis across any gap.
    pub fn window(&self) -> Vec<PageLink> {
        let mut start = self.current.saturating_sub(2).max(1);
        let end = (start + WINDOW - 1).min(self.total);
        if end - start < WINDOW - 1 {
            start = end.saturating_sub(WINDOW - 1).max(1);
        }

        let mut links = Vec::new();
        if start > 1 {
            links.push(PageLink::Page(1));
            if start > 2 {
                links.push(PageLink::Ellipsis);
            }
        }
        links.extend((start..=end).map(PageLink::Page));
        if end < self.total {
            if end < self.total - 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(PageLink::Page(self.total));
        }
        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Page};

    #[test]
    fn window_at_start() {
        let pager = Pager::new(1, 10);
        assert_eq!(
            pager.window(),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
        assert!(!pager.has_prev());
        assert!(pager.has_next());
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(
            Pager::new(5, 10).window(),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Page(6), Page(7), Ellipsis, Page(10)]
        );
        assert_eq!(
            Pager::new(4, 10).window(),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn window_shifts_left_near_the_end() {
        let pager = Pager::new(10, 10);
        assert_eq!(
            pager.window(),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
        assert!(!pager.has_next());
    }

    #[test]
    fn small_totals_show_every_page() {
        assert_eq!(Pager::new(2, 3).window(), vec![Page(1), Page(2), Page(3)]);
        assert_eq!(Pager::new(1, 1).window(), vec![Page(1)]);
        assert_eq!(Pager::new(1, 0).total, 1);
    }

    #[test]
    fn requested_pages_are_clamped() {
        let pager = Pager::new(0, 10);
        assert_eq!(pager.current, 1);
        assert_eq!(pager.clamp(42), 10);
        assert_eq!(pager.clamp(0), 1);
    }
}
