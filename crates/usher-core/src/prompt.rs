//! System-context composition for business-bound conversations.
//!
//! The context handed to the generator is the tenant's prompt template
//! (or a synthesized one when none is set), followed by fixed
//! behavioral guidelines and the business FAQ.

use crate::business::Business;

/// Behavioral guidelines appended to every business context.
const GUIDELINES: &str = "\
Guidelines:
- Keep replies short and to the point.
- Answer in the language the customer writes in.
- Never ask the customer to clarify; answer with what you have.
- Never include curly braces or template placeholders in a reply.";

/// Build the full system context for a bound business.
pub fn system_context(business: &Business) -> String {
    let mut sections = Vec::new();

    let base = match &business.prompt_template {
        Some(template) if !template.trim().is_empty() => fill_template(template, business),
        _ => synthesized_template(business),
    };
    sections.push(base);
    sections.push(GUIDELINES.to_string());

    if !business.faq.is_empty() {
        sections.push(format_faq(business));
    }

    sections.join("\n\n")
}

/// Substitute the known placeholder keys. Unknown placeholders are
/// left in place; the outbound placeholder check catches any that
/// leak through generation.
fn fill_template(template: &str, business: &Business) -> String {
    let hours = effective_hours(business).unwrap_or_default();
    template
        .replace("{name}", &business.name)
        .replace("{business_name}", &business.name)
        .replace("{description}", &business.description)
        .replace("{phone}", &business.phone)
        .replace("{hours}", &hours)
}

fn synthesized_template(business: &Business) -> String {
    let mut lines = vec![format!(
        "You are the virtual assistant for {}.",
        business.name
    )];
    if !business.description.is_empty() {
        lines.push(business.description.clone());
    }
    if let Some(hours) = effective_hours(business) {
        lines.push(format!("Opening hours: {hours}"));
    }
    lines.join("\n")
}

/// Opening hours for the context: the structured field when set,
/// otherwise a best-effort scan of the prompt template for an
/// hours-looking line. The scan is a fallback, not a contract; it
/// keeps the first line carrying an HH:MM shaped token.
pub fn effective_hours(business: &Business) -> Option<String> {
    if let Some(hours) = &business.hours {
        if !hours.trim().is_empty() {
            return Some(hours.trim().to_string());
        }
    }
    let template = business.prompt_template.as_deref()?;
    template
        .lines()
        .find(|line| contains_time_token(line))
        .map(|line| line.trim().to_string())
}

fn contains_time_token(line: &str) -> bool {
    let b = line.as_bytes();
    if b.len() < 4 {
        return false;
    }
    (1..b.len() - 2).any(|i| {
        b[i] == b':'
            && b[i - 1].is_ascii_digit()
            && b[i + 1].is_ascii_digit()
            && b[i + 2].is_ascii_digit()
    })
}

fn format_faq(business: &Business) -> String {
    let mut out = String::from("Frequently asked questions:");
    for entry in &business.faq {
        out.push_str(&format!("\nQ: {}\nA: {}", entry.question, entry.answer));
    }
    out
}
