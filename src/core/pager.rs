/// One page of a filtered result sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Size of the whole filtered sequence
    pub count: usize,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    pub fn num_pages(&self) -> usize {
        self.count.div_ceil(self.page_size as usize)
    }

    pub fn next_page(&self) -> Option<u32> {
        ((self.page as usize) < self.num_pages()).then(|| self.page + 1)
    }

    /// Previous page number, pointing at the last real page when `page` overshoots
    pub fn previous_page(&self) -> Option<u32> {
        if self.page <= 1 {
            return None;
        }
        let last = self.num_pages().max(1) as u32;
        Some((self.page - 1).min(last))
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

/// Slice `items` into the `page`-th window of `page_size` elements
///
/// `page_size` is capped to `[1, max_page_size]`. A page past the end yields
/// no items but still reports the full count. Pages are 1-based; callers
/// validate `page >= 1` before getting here.
pub fn paginate<T>(items: Vec<T>, page: u32, page_size: u32, max_page_size: u32) -> Page<T> {
    debug_assert!(page >= 1, "pages are 1-based");
    let page = page.max(1);
    let page_size = page_size.clamp(1, max_page_size.max(1));
    let count = items.len();

    let start = (page as usize - 1).saturating_mul(page_size as usize);
    let items = if start >= count {
        Vec::new()
    } else {
        items
            .into_iter()
            .skip(start)
            .take(page_size as usize)
            .collect()
    };

    Page {
        items,
        count,
        page,
        page_size,
    }
}
