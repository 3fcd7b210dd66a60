//! Localized strings for user-facing replies.
//!
//! Two languages: Hebrew and English. The language of a reply follows
//! the language of the inbound text that triggered it, detected by
//! character range. `t(key, lang)` serves static strings; `format.rs`
//! holds helpers with interpolation.

mod format;

pub use format::*;

use usher_core::sanitize::contains_hebrew;

/// Reply language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    He,
    En,
}

/// Detect the reply language from inbound text.
pub fn detect(text: &str) -> Lang {
    if contains_hebrew(text) {
        Lang::He
    } else {
        Lang::En
    }
}

/// Return a localized static string for `key`.
pub fn t(key: &str, lang: Lang) -> &'static str {
    match (key, lang) {
        ("help", Lang::He) => {
            "אפשר לשלוח לי הודעה חופשית ואענה בשם העסק שנבחר.\n\
             פקודות:\n\
             מספר עסק — בחירת עסק מהרשימה\n\
             0 — צ'אט כללי ללא עסק\n\
             החלף — החלפת עסק\n\
             הבא / הקודם — דפדוף ברשימה\n\
             עזרה — ההודעה הזו"
        }
        ("help", Lang::En) => {
            "Send me a free-form message and I'll answer for the selected business.\n\
             Commands:\n\
             a number — choose a business from the list\n\
             0 — general chat, no business\n\
             switch — change business\n\
             next / previous — page through the list\n\
             help — this message"
        }
        ("apology", Lang::He) => "מצטערים, משהו השתבש אצלנו. נסו שוב בעוד רגע.",
        ("apology", Lang::En) => "Sorry, something went wrong on our side. Please try again shortly.",
        ("general_chat", Lang::He) => "עברנו לצ'אט כללי. שלחו 'החלף' כדי לבחור עסק.",
        ("general_chat", Lang::En) => "You're in general chat now. Send 'switch' to pick a business.",
        ("debug_unbound", Lang::He) => "דיבאג זמין רק כשעסק נבחר.",
        ("debug_unbound", Lang::En) => "Debug is only available when a business is selected.",
        ("no_businesses", Lang::He) => "אין עסקים זמינים כרגע.",
        ("no_businesses", Lang::En) => "No businesses are available right now.",
        ("invalid_choice", Lang::He) => "המספר הזה לא ברשימה. נסו מספר אחר.",
        ("invalid_choice", Lang::En) => "That number isn't on the list. Try another one.",
        _ => "???",
    }
}
