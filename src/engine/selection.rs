//! Business selection: state derivation, the transition function, list
//! pagination and index resolution.
//!
//! Everything here is pure. The pipeline owns the effects (directory
//! fetches, session writes, outbound sends) and calls in for the
//! decisions; every movement between selection states is decided by
//! [`transition`] and nowhere else.

use usher_core::business::Business;
use usher_sessions::{Session, GENERAL_CHAT_ID};

/// Interactive button ids for business selection carry this prefix
/// followed by the business id.
pub(crate) const BUSINESS_BUTTON_PREFIX: &str = "biz_";

/// Where a user stands in the selection flow, derived from the session
/// snapshot. `Browsing` wins over a stale binding: while the list is
/// open, replies are selection input, not conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SelectionState {
    /// No session, or a session that never bound anything.
    Unbound,
    /// The business list is open at this page.
    Browsing { page: usize },
    /// Bound to a business; free text goes to generation.
    Bound { business_id: String },
    /// Explicitly chosen businessless chat.
    GeneralChat,
}

/// Derive the selection state from a session snapshot.
pub(crate) fn state_of(session: Option<&Session>) -> SelectionState {
    let Some(session) = session else {
        return SelectionState::Unbound;
    };
    if let Some(nav) = session.navigation {
        return SelectionState::Browsing { page: nav.page };
    }
    if session.business_id == GENERAL_CHAT_ID {
        return SelectionState::GeneralChat;
    }
    if session.business_id.is_empty() {
        return SelectionState::Unbound;
    }
    SelectionState::Bound {
        business_id: session.business_id.clone(),
    }
}

/// One piece of input that can move the selection machine.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SelectionInput<'a> {
    /// Normalized free text.
    Text(&'a str),
    /// The switch command, with an optional embedded 1-based index.
    Switch(Option<usize>),
    /// The literal `0`: businessless chat.
    GeneralChat,
    /// Page forward.
    Next,
    /// Page backward.
    Previous,
    /// Raw interactive button id.
    Button(&'a str),
}

/// What the pipeline must do next, as decided by [`transition`].
#[derive(Debug, PartialEq)]
pub(crate) enum Step<'a> {
    /// Bind to this business.
    Bind(&'a Business),
    /// Bind to this business id (button path; resolved via the
    /// directory by the caller).
    BindId(String),
    /// Enter general chat.
    BindGeneralChat,
    /// Render this page and leave the list open.
    ShowPage(usize),
    /// Out-of-range selection: send the hint, then render this page.
    Invalid(usize),
    /// Not selection input here; the text is conversation.
    Converse,
    /// Nothing to do (button id this engine does not own).
    Drop,
}

/// Whether [`transition`] consults the business listing for this
/// input, so the caller knows when a directory fetch is required.
pub(crate) fn needs_listing(state: &SelectionState, input: &SelectionInput<'_>) -> bool {
    match input {
        SelectionInput::Switch(_) => true,
        SelectionInput::Text(_) | SelectionInput::Next | SelectionInput::Previous => matches!(
            state,
            SelectionState::Unbound | SelectionState::Browsing { .. }
        ),
        SelectionInput::GeneralChat | SelectionInput::Button(_) => false,
    }
}

/// The single transition function of the selection machine.
///
/// `businesses` is the full directory listing when
/// [`needs_listing`] said so, and may be empty otherwise.
pub(crate) fn transition<'a>(
    state: &SelectionState,
    input: SelectionInput<'_>,
    businesses: &'a [Business],
    page_size: usize,
) -> Step<'a> {
    match (state, input) {
        (_, SelectionInput::Button(id)) => match button_business_id(id) {
            Some(business_id) => Step::BindId(business_id.to_string()),
            None => Step::Drop,
        },
        (_, SelectionInput::GeneralChat) => Step::BindGeneralChat,
        (_, SelectionInput::Switch(Some(index))) => match resolve_index(businesses, index) {
            Some(business) => Step::Bind(business),
            None => Step::Invalid(0),
        },
        (_, SelectionInput::Switch(None)) => Step::ShowPage(0),
        (SelectionState::Browsing { page }, SelectionInput::Next) => {
            Step::ShowPage(wrap_next(*page, total_pages(businesses.len(), page_size)))
        }
        (SelectionState::Browsing { page }, SelectionInput::Previous) => {
            Step::ShowPage(wrap_prev(*page, total_pages(businesses.len(), page_size)))
        }
        // Paging words with no list open: an unbound user gets the
        // list, a bound one is just talking.
        (SelectionState::Unbound, SelectionInput::Next | SelectionInput::Previous) => {
            Step::ShowPage(0)
        }
        (_, SelectionInput::Next | SelectionInput::Previous) => Step::Converse,
        (SelectionState::Unbound, SelectionInput::Text(text)) => match bare_index(text) {
            Some(index) => match resolve_index(businesses, index) {
                Some(business) => Step::Bind(business),
                None => Step::ShowPage(0),
            },
            None => Step::ShowPage(0),
        },
        (SelectionState::Browsing { page }, SelectionInput::Text(text)) => match bare_index(text) {
            Some(index) => match resolve_index(businesses, index) {
                Some(business) => Step::Bind(business),
                None => Step::Invalid(*page),
            },
            None => Step::ShowPage(*page),
        },
        (
            SelectionState::Bound { .. } | SelectionState::GeneralChat,
            SelectionInput::Text(_),
        ) => Step::Converse,
    }
}

fn bare_index(normalized: &str) -> Option<usize> {
    normalized.parse().ok()
}

/// Number of pages needed for `total` entries. Never zero: an empty
/// list still renders one (empty) page.
pub(crate) fn total_pages(total: usize, page_size: usize) -> usize {
    if total == 0 || page_size == 0 {
        return 1;
    }
    total.div_ceil(page_size)
}

/// Next page, wrapping past the last page back to the first.
pub(crate) fn wrap_next(page: usize, total_pages: usize) -> usize {
    if page + 1 >= total_pages {
        0
    } else {
        page + 1
    }
}

/// Previous page, wrapping past the first page back to the last.
pub(crate) fn wrap_prev(page: usize, total_pages: usize) -> usize {
    if page == 0 {
        total_pages.saturating_sub(1)
    } else {
        page - 1
    }
}

/// The slice of the full list shown on `page`.
pub(crate) fn page_slice(businesses: &[Business], page: usize, page_size: usize) -> &[Business] {
    let start = page * page_size;
    if start >= businesses.len() || page_size == 0 {
        return &[];
    }
    let end = (start + page_size).min(businesses.len());
    &businesses[start..end]
}

/// Resolve a 1-based index against the full list, regardless of which
/// page is showing.
pub(crate) fn resolve_index(businesses: &[Business], index: usize) -> Option<&Business> {
    if index == 0 {
        return None;
    }
    businesses.get(index - 1)
}

/// Extract the business id from a selection button id.
pub(crate) fn button_business_id(button_id: &str) -> Option<&str> {
    let id = button_id.strip_prefix(BUSINESS_BUTTON_PREFIX)?;
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usher_sessions::Navigation;

    fn listing(count: usize) -> Vec<Business> {
        (1..=count)
            .map(|i| Business {
                id: format!("biz-{i}"),
                name: format!("Business {i}"),
                ..Business::default()
            })
            .collect()
    }

    #[test]
    fn no_session_is_unbound() {
        assert_eq!(state_of(None), SelectionState::Unbound);
    }

    #[test]
    fn browsing_wins_over_stale_binding() {
        let session = Session {
            business_id: "biz-1".to_string(),
            navigation: Some(Navigation {
                page: 2,
                page_size: 5,
                total_count: 12,
            }),
            ..Session::default()
        };
        assert_eq!(state_of(Some(&session)), SelectionState::Browsing { page: 2 });
    }

    #[test]
    fn general_chat_id_derives_general_chat() {
        let session = Session {
            business_id: GENERAL_CHAT_ID.to_string(),
            ..Session::default()
        };
        assert_eq!(state_of(Some(&session)), SelectionState::GeneralChat);
    }

    #[test]
    fn bound_session_derives_bound() {
        let session = Session {
            business_id: "biz-7".to_string(),
            ..Session::default()
        };
        assert_eq!(
            state_of(Some(&session)),
            SelectionState::Bound {
                business_id: "biz-7".to_string()
            }
        );
    }

    #[test]
    fn twelve_entries_at_five_per_page_is_three_pages() {
        assert_eq!(total_pages(12, 5), 3);
        assert_eq!(total_pages(10, 5), 2);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(0, 5), 1);
    }

    #[test]
    fn next_wraps_from_last_page_to_first() {
        assert_eq!(wrap_next(2, 3), 0);
        assert_eq!(wrap_next(0, 3), 1);
    }

    #[test]
    fn previous_wraps_from_first_page_to_last() {
        assert_eq!(wrap_prev(0, 3), 2);
        assert_eq!(wrap_prev(2, 3), 1);
    }

    #[test]
    fn page_slice_clamps_the_tail() {
        let all = listing(12);
        assert_eq!(page_slice(&all, 0, 5).len(), 5);
        assert_eq!(page_slice(&all, 2, 5).len(), 2);
        assert_eq!(page_slice(&all, 2, 5)[0].id, "biz-11");
        assert!(page_slice(&all, 9, 5).is_empty());
    }

    #[test]
    fn index_resolution_is_absolute_and_one_based() {
        let all = listing(12);
        assert_eq!(resolve_index(&all, 7).map(|b| b.id.as_str()), Some("biz-7"));
        assert_eq!(resolve_index(&all, 12).map(|b| b.id.as_str()), Some("biz-12"));
        assert!(resolve_index(&all, 0).is_none());
        assert!(resolve_index(&all, 13).is_none());
    }

    #[test]
    fn button_ids_carry_the_business_id() {
        assert_eq!(button_business_id("biz_cafe-9"), Some("cafe-9"));
        assert!(button_business_id("biz_").is_none());
        assert!(button_business_id("other_1").is_none());
    }

    #[test]
    fn unbound_in_range_numeral_binds() {
        let all = listing(3);
        let step = transition(&SelectionState::Unbound, SelectionInput::Text("2"), &all, 5);
        assert!(matches!(step, Step::Bind(b) if b.id == "biz-2"));
    }

    #[test]
    fn unbound_other_text_opens_the_first_page() {
        let all = listing(3);
        assert_eq!(
            transition(&SelectionState::Unbound, SelectionInput::Text("hello"), &all, 5),
            Step::ShowPage(0)
        );
        // Out of range from nothing is not an error, just the list.
        assert_eq!(
            transition(&SelectionState::Unbound, SelectionInput::Text("9"), &all, 5),
            Step::ShowPage(0)
        );
    }

    #[test]
    fn browsing_numeral_is_absolute() {
        let all = listing(12);
        let state = SelectionState::Browsing { page: 0 };
        let step = transition(&state, SelectionInput::Text("7"), &all, 5);
        assert!(matches!(step, Step::Bind(b) if b.id == "biz-7"));
    }

    #[test]
    fn browsing_out_of_range_hints_and_rerenders() {
        let all = listing(12);
        let state = SelectionState::Browsing { page: 1 };
        assert_eq!(
            transition(&state, SelectionInput::Text("13"), &all, 5),
            Step::Invalid(1)
        );
        assert_eq!(
            transition(&state, SelectionInput::Text("anything"), &all, 5),
            Step::ShowPage(1)
        );
    }

    #[test]
    fn paging_wraps_only_while_browsing() {
        let all = listing(12);
        assert_eq!(
            transition(&SelectionState::Browsing { page: 2 }, SelectionInput::Next, &all, 5),
            Step::ShowPage(0)
        );
        assert_eq!(
            transition(&SelectionState::Browsing { page: 0 }, SelectionInput::Previous, &all, 5),
            Step::ShowPage(2)
        );
        let bound = SelectionState::Bound {
            business_id: "biz-1".to_string(),
        };
        assert_eq!(transition(&bound, SelectionInput::Next, &all, 5), Step::Converse);
        assert_eq!(
            transition(&SelectionState::Unbound, SelectionInput::Next, &all, 5),
            Step::ShowPage(0)
        );
    }

    #[test]
    fn switch_binds_by_embedded_index_from_any_state() {
        let all = listing(3);
        let bound = SelectionState::Bound {
            business_id: "biz-1".to_string(),
        };
        let step = transition(&bound, SelectionInput::Switch(Some(3)), &all, 5);
        assert!(matches!(step, Step::Bind(b) if b.id == "biz-3"));
        assert_eq!(
            transition(&bound, SelectionInput::Switch(Some(9)), &all, 5),
            Step::Invalid(0)
        );
        assert_eq!(
            transition(&bound, SelectionInput::Switch(None), &all, 5),
            Step::ShowPage(0)
        );
    }

    #[test]
    fn zero_enters_general_chat_from_any_state() {
        let all = listing(3);
        for state in [
            SelectionState::Unbound,
            SelectionState::Browsing { page: 1 },
            SelectionState::Bound {
                business_id: "biz-2".to_string(),
            },
        ] {
            assert_eq!(
                transition(&state, SelectionInput::GeneralChat, &all, 5),
                Step::BindGeneralChat
            );
        }
    }

    #[test]
    fn buttons_bind_directly_and_foreign_ids_drop() {
        let bound = SelectionState::Bound {
            business_id: "biz-1".to_string(),
        };
        assert_eq!(
            transition(&bound, SelectionInput::Button("biz_cafe-9"), &[], 5),
            Step::BindId("cafe-9".to_string())
        );
        assert_eq!(
            transition(&bound, SelectionInput::Button("other_1"), &[], 5),
            Step::Drop
        );
    }

    #[test]
    fn bound_text_is_conversation() {
        let bound = SelectionState::Bound {
            business_id: "biz-1".to_string(),
        };
        assert_eq!(
            transition(&bound, SelectionInput::Text("what are your hours"), &[], 5),
            Step::Converse
        );
        assert!(!needs_listing(&bound, &SelectionInput::Text("hi")));
        assert!(needs_listing(&SelectionState::Unbound, &SelectionInput::Text("hi")));
        assert!(needs_listing(&bound, &SelectionInput::Switch(None)));
        assert!(!needs_listing(&bound, &SelectionInput::Next));
    }
}
