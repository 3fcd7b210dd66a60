//! Command interpretation over normalized message text.
//!
//! Recognition is table-driven: the keyword lists live in
//! `keywords_data.rs` and this module only walks them. Commands always
//! win over free text. A bare numeral is deliberately NOT a command;
//! its meaning depends on selection state, so the selection flow owns
//! it.

pub(super) use super::keywords_data::*;

/// A control command recognized in an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Help,
    /// Re-open the business list, optionally jumping straight to a
    /// 1-based index embedded in the same message ("switch 3").
    Switch(Option<usize>),
    NextPage,
    PrevPage,
    Debug,
    GeneralChat,
}

/// Interpret normalized (trimmed, lowercased) text as a control command.
pub(super) fn parse(text: &str) -> Option<Command> {
    if text == GENERAL_CHAT_SENTINEL {
        return Some(Command::GeneralChat);
    }
    if exact_match(text, HELP_KW) {
        return Some(Command::Help);
    }
    if exact_match(text, DEBUG_KW) {
        return Some(Command::Debug);
    }
    if exact_match(text, NEXT_KW) {
        return Some(Command::NextPage);
    }
    if exact_match(text, PREV_KW) {
        return Some(Command::PrevPage);
    }
    if let Some(rest) = strip_keyword(text, SWITCH_KW) {
        return Some(Command::Switch(embedded_index(rest)));
    }
    // A standalone ordinal ("number 3", "מספר 3") reads as a switch
    // with an embedded index, from any state.
    if let Some(rest) = strip_keyword(text, ORDINAL_MARKERS) {
        if let Some(index) = embedded_index(rest) {
            return Some(Command::Switch(Some(index)));
        }
    }
    None
}

/// Whole-message match against a keyword list.
fn exact_match(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|kw| text == *kw)
}

/// Prefix match against a keyword list, requiring a word boundary.
/// Returns the remainder after the keyword, leading whitespace trimmed.
fn strip_keyword<'a>(text: &'a str, keywords: &[&str]) -> Option<&'a str> {
    for kw in keywords {
        if let Some(rest) = text.strip_prefix(kw) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return Some(rest.trim_start());
            }
        }
    }
    None
}

/// Scan the remainder of a command for a business index, skipping
/// ordinal markers and filler words ("switch to number 3" -> 3).
fn embedded_index(rest: &str) -> Option<usize> {
    for token in rest.split_whitespace() {
        let token = token.trim_matches(|c: char| !c.is_alphanumeric());
        if token.is_empty()
            || ORDINAL_MARKERS.contains(&token)
            || INDEX_FILLERS.contains(&token)
        {
            continue;
        }
        return token.parse().ok();
    }
    None
}
