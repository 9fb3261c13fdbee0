//! Page math for list endpoints

/// Number of list pages needed for `total` items
pub fn page_count(total: i64, page_size: u32) -> u32 {
    if total <= 0 || page_size == 0 {
        return 0;
    }
    let size = u64::from(page_size);
    let pages = (total as u64 + size - 1) / size;
    u32::try_from(pages).unwrap_or(u32::MAX)
}

/// Pages to visit, highest page number first
///
/// The newest items land on the highest page, so walking downwards meets
/// items added since the last run before the ones already mirrored.
pub fn descending_pages(total: i64, page_size: u32) -> impl Iterator<Item = u32> {
    (1..=page_count(total, page_size)).rev()
}
