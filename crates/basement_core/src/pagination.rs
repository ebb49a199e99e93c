//! Page math and page-button layout for list views.
//!
//! Pure computation; never touches storage.
//!
//! Button layout for 99 pages with page 15 selected:
//!
//! ```text
//! [first] [back 5] [prev] [current] [next] [forward 5] [last]
//!   01      10      14      15       16       20        99
//! ```

use serde::Serialize;

/// Jump buttons appear once a listing has this many pages.
pub const JUMP_BUTTONS_MIN_PAGES: u32 = 10;
/// Distance covered by a jump button.
pub const JUMP_DISTANCE: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonRole {
    First,
    JumpBack,
    Previous,
    Current,
    Next,
    JumpForward,
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageButton {
    pub role: ButtonRole,
    pub page: u32,
    /// Page number, zero-padded to the width of the last page number.
    pub text: String,
    pub selected: bool,
    /// Set when following the button would not change the page.
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub total_count: u64,
    pub limit: u32,
    pub total_pages: u32,
    pub current_page: u32,
    pub next_page: u32,
    pub prev_page: u32,
    pub buttons: Vec<PageButton>,
}

impl Pagination {
    /// Computes page metadata for `total_count` rows shown `limit` at a time.
    ///
    /// A zero `limit` is treated as 1. `requested_page` is clamped into
    /// `1..=total_pages`.
    pub fn compute(total_count: u64, limit: u32, requested_page: u32) -> Self {
        let limit = limit.max(1);
        let total_pages = total_pages(total_count, limit);
        let current_page = requested_page.clamp(1, total_pages);
        let clamp = |page: i64| page.clamp(1, i64::from(total_pages)) as u32;
        let current = i64::from(current_page);

        let next_page = clamp(current + 1);
        let prev_page = clamp(current - 1);
        let width = if total_pages >= JUMP_BUTTONS_MIN_PAGES {
            total_pages.to_string().len()
        } else {
            0
        };
        let button = |role: ButtonRole, page: u32| PageButton {
            role,
            page,
            text: format!("{page:0width$}"),
            selected: role == ButtonRole::Current,
            disabled: role != ButtonRole::Current && page == current_page,
        };

        let with_jumps = total_pages >= JUMP_BUTTONS_MIN_PAGES;
        let jump = i64::from(JUMP_DISTANCE);
        let mut buttons = vec![button(ButtonRole::First, 1)];
        if with_jumps {
            buttons.push(button(ButtonRole::JumpBack, clamp(current - jump)));
        }
        buttons.push(button(ButtonRole::Previous, prev_page));
        buttons.push(button(ButtonRole::Current, current_page));
        buttons.push(button(ButtonRole::Next, next_page));
        if with_jumps {
            buttons.push(button(ButtonRole::JumpForward, clamp(current + jump)));
        }
        buttons.push(button(ButtonRole::Last, total_pages));

        Self {
            total_count,
            limit,
            total_pages,
            current_page,
            next_page,
            prev_page,
            buttons,
        }
    }

    /// Zero-based row offset of the current page.
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page - 1) * u64::from(self.limit)
    }

    pub fn button(&self, role: ButtonRole) -> Option<&PageButton> {
        self.buttons.iter().find(|button| button.role == role)
    }
}

fn total_pages(total_count: u64, limit: u32) -> u32 {
    let pages = total_count.div_ceil(u64::from(limit)).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::{ButtonRole, Pagination};

    fn pages(pagination: &Pagination) -> Vec<u32> {
        pagination.buttons.iter().map(|button| button.page).collect()
    }

    #[test]
    fn empty_listing_has_one_disabled_page() {
        let pagination = Pagination::compute(0, 10, 1);
        assert_eq!(pagination.total_pages, 1);
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.next_page, 1);
        assert_eq!(pagination.prev_page, 1);
        for role in [ButtonRole::First, ButtonRole::Previous, ButtonRole::Next, ButtonRole::Last] {
            assert!(pagination.button(role).unwrap().disabled, "{role:?}");
        }
        assert!(pagination.button(ButtonRole::Current).unwrap().selected);
        assert!(pagination.button(ButtonRole::JumpBack).is_none());
    }

    #[test]
    fn requested_page_is_clamped() {
        let pagination = Pagination::compute(25, 10, 9);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.current_page, 3);
        assert_eq!(pagination.offset(), 20);

        let pagination = Pagination::compute(25, 10, 0);
        assert_eq!(pagination.current_page, 1);
        assert_eq!(pagination.offset(), 0);
    }

    #[test]
    fn small_listing_has_five_buttons() {
        let pagination = Pagination::compute(50, 10, 3);
        assert_eq!(pages(&pagination), vec![1, 2, 3, 4, 5]);
        assert!(pagination.buttons.iter().all(|button| !button.disabled));
        assert_eq!(pagination.button(ButtonRole::Next).unwrap().text, "4");
    }

    #[test]
    fn large_listing_adds_padded_jump_buttons() {
        let pagination = Pagination::compute(990, 10, 15);
        assert_eq!(pagination.total_pages, 99);
        assert_eq!(pages(&pagination), vec![1, 10, 14, 15, 16, 20, 99]);

        let texts = pagination
            .buttons
            .iter()
            .map(|button| button.text.as_str())
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["01", "10", "14", "15", "16", "20", "99"]);
    }

    #[test]
    fn jump_buttons_clamp_at_edges() {
        let pagination = Pagination::compute(100, 10, 2);
        assert_eq!(pages(&pagination), vec![1, 1, 1, 2, 3, 7, 10]);
        assert!(!pagination.button(ButtonRole::JumpBack).unwrap().disabled);

        let pagination = Pagination::compute(100, 10, 10);
        assert!(pagination.button(ButtonRole::JumpForward).unwrap().disabled);
        assert!(pagination.button(ButtonRole::Last).unwrap().disabled);
        assert!(!pagination.button(ButtonRole::First).unwrap().disabled);
    }

    #[test]
    fn zero_limit_is_treated_as_one() {
        let pagination = Pagination::compute(3, 0, 2);
        assert_eq!(pagination.limit, 1);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(pagination.current_page, 2);
    }
}
