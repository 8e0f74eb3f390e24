use crate::data::DEFAULT_PAGE_LIMIT;
use std::ops::RangeInclusive;

///How many page-number buttons the pagination strip shows at once.
pub const PAGE_WINDOW: i64 = 5;

///Page size the UI uses for the "All" option. Effectively unbounded.
pub const LIMIT_ALL: i64 = i64::MAX;

///Everything the list view needs to redraw itself, owned explicitly rather
///than spread over ad-hoc mutable globals. The pagination window is derived
///from `page` (see [`window_start`]), never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub page: i64,
    pub limit: i64,
    pub keyword: String,
    ///Id of the row whose edit form is open, if any.
    pub editing: Option<i32>,
    ///Id armed for deletion - nothing is sent to the database until the
    ///confirmation step fires.
    pub pending_delete: Option<i32>,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_LIMIT,
            keyword: String::new(),
            editing: None,
            pending_delete: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    GoToPage(i64),
    NextPage,
    PrevPage,
    SetLimit(i64),
    SetKeyword(String),
    BeginEdit(i32),
    CancelEdit,
    FinishEdit,
    ArmDelete(i32),
    CancelDelete,
    FinishDelete,
}

impl ListView {
    ///Pure transition function. Out-of-range page changes are ignored;
    ///anything that refetches a different slice drops an armed delete.
    #[must_use]
    pub fn apply(self, event: ViewEvent, total_pages: i64) -> Self {
        match event {
            ViewEvent::GoToPage(page) => {
                if page >= 1 && page <= total_pages {
                    Self {
                        page,
                        pending_delete: None,
                        ..self
                    }
                } else {
                    self
                }
            }
            ViewEvent::NextPage => {
                let next = self.page + 1;
                self.apply(ViewEvent::GoToPage(next), total_pages)
            }
            ViewEvent::PrevPage => {
                let prev = self.page - 1;
                self.apply(ViewEvent::GoToPage(prev), total_pages)
            }
            ViewEvent::SetLimit(limit) => Self {
                page: 1,
                limit: limit.max(1),
                pending_delete: None,
                ..self
            },
            ViewEvent::SetKeyword(keyword) => Self {
                page: 1,
                keyword,
                pending_delete: None,
                ..self
            },
            ViewEvent::BeginEdit(id) => Self {
                editing: Some(id),
                ..self
            },
            ViewEvent::CancelEdit | ViewEvent::FinishEdit => Self {
                editing: None,
                ..self
            },
            ViewEvent::ArmDelete(id) => Self {
                pending_delete: Some(id),
                ..self
            },
            ViewEvent::CancelDelete | ViewEvent::FinishDelete => Self {
                pending_delete: None,
                ..self
            },
        }
    }

    ///The page numbers currently on show. Empty when there are no pages at all.
    pub fn window(&self, total_pages: i64) -> RangeInclusive<i64> {
        let start = window_start(self.page);
        start..=(start + PAGE_WINDOW - 1).min(total_pages)
    }
}

///First page button of the window containing `page` - always derived, so the
///strip can never drift away from the page actually being displayed.
pub fn window_start(page: i64) -> i64 {
    (page - 1) / PAGE_WINDOW * PAGE_WINDOW + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(page: i64) -> ListView {
        ListView {
            page,
            ..ListView::default()
        }
    }

    #[test]
    fn page_changes_stay_in_range() {
        assert_eq!(view(1).apply(ViewEvent::GoToPage(3), 5).page, 3);
        assert_eq!(view(1).apply(ViewEvent::GoToPage(0), 5).page, 1);
        assert_eq!(view(1).apply(ViewEvent::GoToPage(6), 5).page, 1);
        assert_eq!(view(1).apply(ViewEvent::NextPage, 1).page, 1);
        assert_eq!(view(1).apply(ViewEvent::PrevPage, 5).page, 1);
        assert_eq!(view(4).apply(ViewEvent::NextPage, 5).page, 5);
        assert_eq!(view(4).apply(ViewEvent::PrevPage, 5).page, 3);
    }

    #[test]
    fn page_changes_are_ignored_with_no_pages() {
        assert_eq!(view(1).apply(ViewEvent::GoToPage(1), 0).page, 1);
        assert_eq!(view(1).apply(ViewEvent::NextPage, 0).page, 1);
    }

    #[test]
    fn search_and_size_changes_reset_to_the_first_page() {
        let searched = view(7).apply(ViewEvent::SetKeyword("smith".to_string()), 10);
        assert_eq!(searched.page, 1);
        assert_eq!(searched.keyword, "smith");

        let resized = view(7).apply(ViewEvent::SetLimit(10), 10);
        assert_eq!(resized.page, 1);
        assert_eq!(resized.limit, 10);
    }

    #[test]
    fn edit_buffer_arms_and_clears() {
        let editing = view(2).apply(ViewEvent::BeginEdit(9), 5);
        assert_eq!(editing.editing, Some(9));

        //the buffer survives paging, matching the original behaviour
        let paged = editing.clone().apply(ViewEvent::GoToPage(3), 5);
        assert_eq!(paged.editing, Some(9));

        assert_eq!(editing.clone().apply(ViewEvent::CancelEdit, 5).editing, None);
        assert_eq!(editing.apply(ViewEvent::FinishEdit, 5).editing, None);
    }

    #[test]
    fn delete_confirmation_requires_an_explicit_step() {
        let armed = view(2).apply(ViewEvent::ArmDelete(9), 5);
        assert_eq!(armed.pending_delete, Some(9));

        assert_eq!(
            armed.clone().apply(ViewEvent::CancelDelete, 5).pending_delete,
            None
        );
        assert_eq!(armed.apply(ViewEvent::FinishDelete, 5).pending_delete, None);
    }

    #[test]
    fn refetching_a_different_slice_disarms_a_pending_delete() {
        let armed = view(2).apply(ViewEvent::ArmDelete(9), 5);
        assert_eq!(armed.clone().apply(ViewEvent::GoToPage(3), 5).pending_delete, None);
        assert_eq!(
            armed
                .clone()
                .apply(ViewEvent::SetKeyword("x".to_string()), 5)
                .pending_delete,
            None
        );
        assert_eq!(armed.apply(ViewEvent::SetLimit(10), 5).pending_delete, None);
    }

    #[test]
    fn window_start_is_derived_from_the_current_page() {
        assert_eq!(window_start(1), 1);
        assert_eq!(window_start(5), 1);
        assert_eq!(window_start(6), 6);
        assert_eq!(window_start(10), 6);
        assert_eq!(window_start(11), 11);
    }

    #[test]
    fn window_is_clipped_to_the_page_count() {
        assert_eq!(view(1).window(3), 1..=3);
        assert_eq!(view(1).window(12), 1..=5);
        assert_eq!(view(7).window(12), 6..=10);
        assert_eq!(view(11).window(12), 11..=12);
        assert!(view(1).window(0).is_empty());
    }
}
