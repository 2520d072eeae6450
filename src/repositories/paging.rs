//! Page arithmetic for list queries

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A 1-based page of `page_size` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Page 0 is read as page 1 and a page size of 0 as 1.
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn first(page_size: u32) -> Self {
        Self::new(1, page_size)
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// First row number of the page (inclusive, 1-based).
    pub fn start(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.page_size) + 1
    }

    /// Last row number of the page (inclusive).
    pub fn finish(&self) -> i64 {
        i64::from(self.page) * i64::from(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// One page of an ordered result set plus page-count metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub page_count: u32,
    pub total_count: i64,
}

impl<T> PagedList<T> {
    pub fn new(items: Vec<T>, page: PageRequest, total_count: i64) -> Self {
        let total = total_count.max(0);
        let size = i64::from(page.page_size());
        let page_count = (total + size - 1) / size;

        Self {
            items,
            page_number: page.page(),
            page_count: u32::try_from(page_count).unwrap_or(u32::MAX),
            total_count: total,
        }
    }

    pub fn is_first_page(&self) -> bool {
        self.page_number == 1
    }

    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    pub fn has_next_page(&self) -> bool {
        self.page_number < self.page_count
    }

    pub fn is_last_page(&self) -> bool {
        self.page_number >= self.page_count
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedList<U> {
        PagedList {
            items: self.items.into_iter().map(f).collect(),
            page_number: self.page_number,
            page_count: self.page_count,
            total_count: self.total_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_bounds_are_inclusive_and_one_based() {
        let first = PageRequest::new(1, 25);
        assert_eq!((first.start(), first.finish()), (1, 25));

        let third = PageRequest::new(3, 10);
        assert_eq!((third.start(), third.finish()), (21, 30));
    }

    #[test]
    fn test_zero_page_and_size_are_clamped() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page(), 1);
        assert_eq!(page.page_size(), 1);
        assert_eq!((page.start(), page.finish()), (1, 1));
    }

    #[test]
    fn test_page_count_is_ceiling_of_total_over_size() {
        for size in 1..=12u32 {
            for total in 0..=50i64 {
                let list: PagedList<()> = PagedList::new(vec![], PageRequest::new(1, size), total);
                let expected = (total as f64 / size as f64).ceil() as u32;
                assert_eq!(list.page_count, expected, "total={total} size={size}");
            }
        }
    }

    #[test]
    fn test_empty_result_has_no_pages() {
        let list: PagedList<i32> = PagedList::new(vec![], PageRequest::default(), 0);
        assert_eq!(list.page_count, 0);
        assert!(list.is_first_page());
        assert!(!list.has_next_page());
        assert!(list.is_last_page());
    }

    #[test]
    fn test_navigation_flags() {
        let middle: PagedList<i32> = PagedList::new(vec![1], PageRequest::new(2, 10), 35);
        assert_eq!(middle.page_count, 4);
        assert!(middle.has_previous_page());
        assert!(middle.has_next_page());
        assert!(!middle.is_first_page());
        assert!(!middle.is_last_page());

        let last: PagedList<i32> = PagedList::new(vec![1], PageRequest::new(4, 10), 35);
        assert!(last.is_last_page());
        assert!(!last.has_next_page());
    }

    #[test]
    fn test_map_keeps_metadata() {
        let list = PagedList::new(vec![1, 2], PageRequest::new(1, 2), 3).map(|n| n * 10);
        assert_eq!(list.items, vec![10, 20]);
        assert_eq!(list.page_count, 2);
        assert_eq!(list.total_count, 3);
    }
}
