//! Fixed-size pages and the page-link strip under each table.

use serde::Serialize;

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number that was requested.
    pub page: usize,
    pub page_size: usize,
    /// Length of the whole sequence.
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `ceil(count / page_size)`. A zero page size counts as one.
#[must_use]
pub const fn total_pages(count: usize, page_size: usize) -> usize {
    let size = if page_size == 0 { 1 } else { page_size };
    count.div_ceil(size)
}

/// Slice `[(page - 1) * page_size, page * page_size)` of `items`.
///
/// Pages are 1-based. Page 0, or a page past the end, yields no items. A
/// zero page size is treated as one.
#[must_use]
pub fn paginate<T: Clone>(items: &[T], page_size: usize, page: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let items_on_page = match page.checked_sub(1) {
        Some(index) => items
            .iter()
            .skip(index.saturating_mul(page_size))
            .take(page_size)
            .cloned()
            .collect(),
        None => Vec::new(),
    };

    Page {
        items: items_on_page,
        page,
        page_size,
        total_items: items.len(),
        total_pages: total_pages(items.len(), page_size),
    }
}

/// An entry in the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Number { number: usize, current: bool },
    Ellipsis,
}

/// Page links for `current` out of `total` pages, at most five numbers.
///
/// ```text
/// total <= 5          1 2 3 4 5
/// near the start      1 2 3 4 … N
/// near the end        1 … N-3 N-2 N-1 N
/// in the middle       1 … c-1 c c+1 … N
/// ```
#[must_use]
pub fn page_links(current: usize, total: usize) -> Vec<PageLink> {
    let number = |n: usize| PageLink::Number {
        number: n,
        current: n == current,
    };

    if total <= 5 {
        return (1..=total).map(number).collect();
    }

    if current <= 3 {
        let mut links: Vec<PageLink> = (1..=4).map(number).collect();
        links.push(PageLink::Ellipsis);
        links.push(number(total));
        links
    } else if current >= total - 2 {
        let mut links = vec![number(1), PageLink::Ellipsis];
        links.extend((total - 3..=total).map(number));
        links
    } else {
        vec![
            number(1),
            PageLink::Ellipsis,
            number(current - 1),
            number(current),
            number(current + 1),
            PageLink::Ellipsis,
            number(total),
        ]
    }
}
