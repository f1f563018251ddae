use serde::Serialize;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 10;
/// Upper bound on the page size a caller may request.
pub const MAX_ITEMS_PER_PAGE: usize = 100;
/// Highest page number accepted; keeps row offsets within `i64`.
pub const MAX_PAGE: usize = i64::MAX as usize / MAX_ITEMS_PER_PAGE;

/// Normalizes caller supplied paging: pages are 1-based and sizes capped.
pub fn normalize(page: Option<usize>, per_page: Option<usize>) -> (usize, usize) {
    let page = page.unwrap_or(1).clamp(1, MAX_PAGE);
    let per_page = per_page
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
        .clamp(1, MAX_ITEMS_PER_PAGE);
    (page, per_page)
}

fn get_pages(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    let last_page = total_pages;

    if last_page == 0 {
        return vec![];
    }

    // Out of range pages render the window around the last page.
    let current_page = current_page.min(last_page);
    let mut pages = Vec::new();

    let left_end = (1 + left_edge).min(last_page + 1);
    pages.extend((1..left_end).map(Some));

    let mid_start = left_end.max(current_page.saturating_sub(left_current));
    let mid_end = current_page
        .saturating_add(right_current)
        .saturating_add(1)
        .min(last_page + 1);

    if mid_start > left_end {
        pages.push(None);
    }
    pages.extend((mid_start..mid_end).map(Some));

    let right_start = mid_end.max(last_page.saturating_sub(right_edge) + 1);

    if right_start > mid_end {
        pages.push(None);
    }
    pages.extend((right_start..=last_page).map(Some));

    pages
}

/// One page of a listing. `pages` is a compact page-number window where
/// `None` marks a gap.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub pages: Vec<Option<usize>>,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: usize, current_page: usize, per_page: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);

        let pages = get_pages(total_pages, current_page, 2, 2, 4, 2);

        Self {
            items,
            total,
            page: current_page,
            per_page,
            total_pages,
            pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
            pages: self.pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_defaults_and_caps() {
        assert_eq!(normalize(None, None), (1, DEFAULT_ITEMS_PER_PAGE));
        assert_eq!(normalize(Some(0), Some(0)), (1, 1));
        assert_eq!(normalize(Some(3), Some(1000)), (3, MAX_ITEMS_PER_PAGE));
    }

    #[test]
    fn huge_page_numbers_are_clamped() {
        let (page, per_page) = normalize(Some(usize::MAX), None);
        assert_eq!(page, MAX_PAGE);

        let listing: Paginated<u8> = Paginated::new(vec![], 5, page, per_page);
        assert_eq!(listing.total_pages, 1);
        assert_eq!(listing.pages, vec![Some(1)]);

        let unclamped: Paginated<u8> = Paginated::new(vec![], 5, usize::MAX, 10);
        assert_eq!(unclamped.pages, vec![Some(1)]);

        let past_end: Paginated<u8> = Paginated::new(vec![], 200, 99, 10);
        assert_eq!(past_end.pages.last(), Some(&Some(20)));
    }

    #[test]
    fn window_collapses_far_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 200, 10, 10);
        assert_eq!(page.total_pages, 20);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20)
            ]
        );
    }

    #[test]
    fn empty_listing_has_no_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 0, 0, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.pages.is_empty());
    }
}
