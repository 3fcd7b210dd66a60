//! Localized strings that need interpolation.

use usher_core::business::Business;

use super::Lang;

/// Welcome line sent immediately after a business is bound.
pub fn welcome(lang: Lang, business: &Business) -> String {
    let name = business.name.trim();
    let description = business.description.trim();
    match lang {
        Lang::He => {
            if description.is_empty() {
                format!("ברוכים הבאים אל {name}! איך אפשר לעזור?")
            } else {
                format!("ברוכים הבאים אל {name}! {description}")
            }
        }
        Lang::En => {
            if description.is_empty() {
                format!("Welcome to {name}! How can I help?")
            } else {
                format!("Welcome to {name}! {description}")
            }
        }
    }
}

/// One page of the business list, numbered by absolute position.
///
/// Entries keep their 1-based index from the full list so a reply like
/// "7" works from any page.
pub fn business_page(
    lang: Lang,
    page_entries: &[Business],
    page: usize,
    total_pages: usize,
    start_index: usize,
) -> String {
    let mut lines = Vec::with_capacity(page_entries.len() + 2);
    match lang {
        Lang::He => lines.push(format!("עסקים זמינים (עמוד {}/{}):", page + 1, total_pages)),
        Lang::En => lines.push(format!("Available businesses (page {}/{}):", page + 1, total_pages)),
    }
    for (offset, business) in page_entries.iter().enumerate() {
        let description = business.description.trim();
        if description.is_empty() {
            lines.push(format!("{}. {}", start_index + offset, business.name));
        } else {
            lines.push(format!("{}. {} - {}", start_index + offset, business.name, description));
        }
    }
    match lang {
        Lang::He => lines.push("השיבו במספר לבחירה, 0 לצ'אט כללי, 'הבא'/'הקודם' לדפדוף.".to_string()),
        Lang::En => lines.push("Reply with a number to choose, 0 for general chat, 'next'/'previous' to browse.".to_string()),
    }
    lines.join("\n")
}

/// Operator-facing dump of the bound business.
pub fn debug_dump(business: &Business) -> String {
    let hours = business.hours.as_deref().unwrap_or("-");
    let template = if business.prompt_template.is_some() { "set" } else { "default" };
    format!(
        "id: {}\nname: {}\ntenant: {}\nphone: {}\nhours: {}\nfaq entries: {}\nprompt template: {}",
        business.id,
        business.name,
        business.tenant_id,
        business.phone,
        hours,
        business.faq.len(),
        template,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(name: &str, description: &str) -> Business {
        Business {
            id: "b1".to_string(),
            name: name.to_string(),
            description: description.to_string(),
            ..Business::default()
        }
    }

    #[test]
    fn welcome_includes_name_and_description() {
        let text = welcome(Lang::En, &business("Dana's Bakery", "Fresh sourdough daily"));
        assert!(text.contains("Dana's Bakery"));
        assert!(text.contains("Fresh sourdough daily"));
    }

    #[test]
    fn welcome_without_description_still_reads_well() {
        let text = welcome(Lang::He, &business("מספרה", ""));
        assert!(text.contains("מספרה"));
        assert!(!text.contains("! !"));
    }

    #[test]
    fn page_numbers_are_absolute() {
        let entries = vec![business("Third", ""), business("Fourth", "")];
        let text = business_page(Lang::En, &entries, 1, 2, 3);
        assert!(text.contains("3. Third"));
        assert!(text.contains("4. Fourth"));
        assert!(text.contains("page 2/2"));
    }

    #[test]
    fn debug_dump_lists_fields() {
        let text = debug_dump(&business("Cafe", "Espresso bar"));
        assert!(text.contains("id: b1"));
        assert!(text.contains("faq entries: 0"));
        assert!(text.contains("prompt template: default"));
    }
}
