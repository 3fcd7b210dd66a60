//! Static keyword tables for the command interpreter.
//!
//! Tables are data, not code: adding a language or an alternate
//! phrasing is a new entry here, never a new branch in `keywords.rs`.
//! All entries are lowercase; the interpreter matches against
//! normalized text. All arrays are `pub(super)`, consumed by the
//! `keywords.rs` functions only.

/// Sentinel that always means "general chat, no business".
pub(super) const GENERAL_CHAT_SENTINEL: &str = "0";

/// Help requests. Matched against the whole message.
pub(super) const HELP_KW: &[&str] = &[
    // English
    "help",
    "commands",
    "menu",
    // Hebrew
    "עזרה",
    "תפריט",
    "פקודות",
];

/// Business switching. Matched as a message prefix so an index may
/// follow in the same message ("switch 3", "החלף מספר 2").
pub(super) const SWITCH_KW: &[&str] = &[
    // English
    "switch business",
    "change business",
    "another business",
    "switch",
    // Hebrew
    "החלף עסק",
    "החלפת עסק",
    "עסק אחר",
    "החלף",
];

/// Next page while browsing. Matched against the whole message.
pub(super) const NEXT_KW: &[&str] = &[
    // English
    "next",
    "more",
    // Hebrew
    "הבא",
    "עוד",
];

/// Previous page while browsing. Matched against the whole message.
pub(super) const PREV_KW: &[&str] = &[
    // English
    "previous",
    "prev",
    "back",
    // Hebrew
    "הקודם",
    "אחורה",
];

/// Operator debug dump. Matched against the whole message.
pub(super) const DEBUG_KW: &[&str] = &[
    // English
    "debug",
    // Hebrew
    "דיבאג",
];

/// Ordinal markers that may precede an embedded business index,
/// standalone ("number 3") or after a switch keyword ("switch number 3").
pub(super) const ORDINAL_MARKERS: &[&str] = &[
    // English
    "number",
    "no.",
    // Hebrew
    "מספר",
];

/// Filler tokens skipped when scanning for an embedded index.
pub(super) const INDEX_FILLERS: &[&str] = &[
    // English
    "to",
    "the",
    // Hebrew
    "אל",
    "את",
];
