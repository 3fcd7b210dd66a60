//! Normalization and content checks for inbound and outbound text.
//!
//! - User identifier normalization (transport prefixes collapse)
//! - Text normalization for keyword matching and reply-cache keys
//! - Hebrew detection for bilingual replies
//! - Unresolved-placeholder detection on generated output

/// Transport prefixes that may precede a user identifier.
const ID_PREFIXES: &[&str] = &["whatsapp:", "sms:", "tel:", "messenger:"];

/// Normalize a transport user identifier to a stable session key.
///
/// `whatsapp:+972501234567`, `+972501234567`, and `972501234567` all
/// collapse to the same key.
pub fn normalize_user_id(raw: &str) -> String {
    let mut id = raw.trim();
    for prefix in ID_PREFIXES {
        if let Some(rest) = id.strip_prefix(prefix) {
            id = rest;
            break;
        }
    }
    id = id.trim_start_matches('+');
    id.to_string()
}

/// Normalize message text for keyword matching and cache keys:
/// trimmed and case-folded.
pub fn normalize_text(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether the text contains any Hebrew-range character.
pub fn contains_hebrew(text: &str) -> bool {
    text.chars().any(|c| ('\u{0590}'..='\u{05FF}').contains(&c))
}

/// Whether generated output still carries template placeholder
/// markers. Any surviving brace means substitution failed; such text
/// must never reach a user.
pub fn has_unresolved_placeholders(text: &str) -> bool {
    text.contains('{') || text.contains('}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixed_and_bare_ids_collapse() {
        assert_eq!(normalize_user_id("whatsapp:+972501234567"), "972501234567");
        assert_eq!(normalize_user_id("+972501234567"), "972501234567");
        assert_eq!(normalize_user_id("972501234567"), "972501234567");
        assert_eq!(normalize_user_id(" tel:+14155550100 "), "14155550100");
    }

    #[test]
    fn unknown_prefix_left_alone() {
        assert_eq!(normalize_user_id("signal:12345"), "signal:12345");
    }

    #[test]
    fn text_normalization_trims_and_folds() {
        assert_eq!(normalize_text("  Help  "), "help");
        assert_eq!(normalize_text("NEXT"), "next");
        assert_eq!(normalize_text("עזרה "), "עזרה");
    }

    #[test]
    fn hebrew_detection() {
        assert!(contains_hebrew("שלום"));
        assert!(contains_hebrew("pickup at שדרות רוטשילד"));
        assert!(!contains_hebrew("hello world"));
        assert!(!contains_hebrew(""));
    }

    #[test]
    fn placeholder_detection() {
        assert!(has_unresolved_placeholders("Welcome to {business_name}!"));
        assert!(has_unresolved_placeholders("stray } brace"));
        assert!(!has_unresolved_placeholders("Welcome to Dana's Bakery!"));
    }
}
