//! Pagination over a filtered row sequence
//!
//! Page math mirrors the table screens: `total_pages = ceil(n / size)`,
//! a page index that outlived a shrinking filter clamps down to the last
//! page instead of erroring, and the range label reads `"9-16 of 42"`
//! (`"0-0 of 0"` when nothing matched).

use crate::project::Row;

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Row>,
    pub total_items: usize,
    pub total_pages: usize,
    pub current_page: usize,
    pub range_label: String,
}

/// Slice the visible page out of an already filtered, ordered sequence.
///
/// `page_size` of zero is treated as 1 so the math stays total; callers go
/// through [`crate::config::EngineConfig`] which rejects zero up front.
pub fn paginate(rows: &[Row], page: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total_items = rows.len();
    let total_pages = total_items.div_ceil(page_size);

    // Clamp: recover from a filter that shrank the result set below the
    // previously selected page, and floor at 1 so an empty result still has
    // a well-defined current page.
    let current_page = if total_pages == 0 {
        1
    } else {
        page.clamp(1, total_pages)
    };

    let (items, range_label) = if total_items == 0 {
        (Vec::new(), "0-0 of 0".to_string())
    } else {
        let start = (current_page - 1) * page_size;
        let end = (start + page_size).min(total_items);
        (
            rows[start..end].to_vec(),
            format!("{}-{} of {}", start + 1, end, total_items),
        )
    };

    Page {
        items,
        total_items,
        total_pages,
        current_page,
        range_label,
    }
}
