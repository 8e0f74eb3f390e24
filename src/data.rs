pub mod student;

pub const DEFAULT_PAGE_LIMIT: i64 = 5;

///One page's worth of rows, as requested by a caller. Pages are 1-based.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
        }
    }
}

impl PageRequest {
    ///Pages below 1 and limits below 1 get clamped rather than rejected.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).max(1),
        }
    }

    pub fn offset(self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn total_pages(self, total: i64) -> i64 {
        total.div_ceil(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_first_page_of_five() {
        assert_eq!(PageRequest::new(None, None), PageRequest { page: 1, limit: 5 });
    }

    #[test]
    fn negative_and_zero_pages_clamp_to_one() {
        assert_eq!(PageRequest::new(Some(-3), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(0), Some(10)).offset(), 0);
        assert_eq!(PageRequest::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let req = PageRequest::new(None, Some(5));
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(5), 1);
        assert_eq!(req.total_pages(6), 2);
        assert_eq!(req.total_pages(11), 3);
    }

    #[test]
    fn huge_limits_do_not_overflow_the_offset() {
        let req = PageRequest::new(Some(2), Some(i64::MAX));
        assert_eq!(req.offset(), i64::MAX);
    }
}
