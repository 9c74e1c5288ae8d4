/// Archives shown per history page
pub const PAGE_SIZE: u32 = 5;

/// Position of one history page and links to its neighbours
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub offset: u32,
    /// Link to the newer page, absent on page 1
    pub show_previous: Option<String>,
    /// Link to the older page, present only when archives remain beyond this page
    pub show_next: Option<String>,
}

impl Pagination {
    /// Offset of the first archive on `page`; pages below 1 count as page 1
    pub fn offset_for(page: u32) -> u32 {
        page.max(1).saturating_sub(1).saturating_mul(PAGE_SIZE)
    }

    pub fn new(page: u32, total: u64) -> Self {
        let page = page.max(1);
        let offset = Self::offset_for(page);

        Self {
            page,
            offset,
            show_previous: (page > 1).then(|| format!("/history?page={}", page - 1)),
            show_next: (total > u64::from(offset) + u64::from(PAGE_SIZE))
                .then(|| format!("/history?page={}", page + 1)),
        }
    }
}
