use serde::{Deserialize, Serialize};

/// Rows per page for every paginated listing.
pub const PAGE_SIZE: u32 = 10;

/// Number of page links shown at once in the pager.
pub const PAGE_WINDOW: u32 = 5;

/// Pager block returned next to every paginated listing. The board pages
/// render `firstPage..=lastPage` as links and use `totalPage` to decide
/// whether a "next" arrow is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub first_page: u32,
    pub last_page: u32,
    pub total_page: u32,
}

impl PageMeta {
    pub fn new(page: u32, total_rows: u64) -> Self {
        let page = page.max(1);
        let total_page = total_rows.div_ceil(PAGE_SIZE as u64).max(1) as u32;
        let first_page = ((page - 1) / PAGE_WINDOW) * PAGE_WINDOW + 1;
        let last_page = first_page
            .saturating_add(PAGE_WINDOW - 1)
            .min(total_page)
            .max(first_page);

        Self {
            first_page,
            last_page,
            total_page,
        }
    }
}

/// Row offset for a 1-based page number. Page 0 is treated as page 1.
/// Widened to `u64` so every `u32` page maps to a real offset; pages past
/// the end simply read no rows.
pub fn offset(page: u32) -> u64 {
    u64::from(page.max(1) - 1) * u64::from(PAGE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_listing_has_one_page() {
        let meta = PageMeta::new(1, 0);
        assert_eq!(meta, PageMeta { first_page: 1, last_page: 1, total_page: 1 });
    }

    #[test]
    fn window_is_clamped_to_total() {
        // 23 rows -> 3 pages
        let meta = PageMeta::new(2, 23);
        assert_eq!(meta.first_page, 1);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.total_page, 3);
    }

    #[test]
    fn window_moves_in_blocks() {
        // 120 rows -> 12 pages; page 7 lives in the 6..=10 block
        let meta = PageMeta::new(7, 120);
        assert_eq!(meta.first_page, 6);
        assert_eq!(meta.last_page, 10);
        assert_eq!(meta.total_page, 12);

        let meta = PageMeta::new(11, 120);
        assert_eq!(meta.first_page, 11);
        assert_eq!(meta.last_page, 12);
    }

    #[test]
    fn page_zero_is_page_one() {
        assert_eq!(PageMeta::new(0, 50), PageMeta::new(1, 50));
        assert_eq!(offset(0), 0);
        assert_eq!(offset(3), 20);
    }

    #[test]
    fn largest_page_does_not_overflow() {
        assert_eq!(offset(u32::MAX), (u64::from(u32::MAX) - 1) * 10);

        let meta = PageMeta::new(u32::MAX, 15);
        assert_eq!(meta.total_page, 2);
        assert_eq!(meta.first_page, 4_294_967_291);
        assert_eq!(meta.last_page, meta.first_page);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(PageMeta::new(1, 15)).unwrap();
        assert_eq!(json["firstPage"], 1);
        assert_eq!(json["lastPage"], 2);
        assert_eq!(json["totalPage"], 2);
    }
}
