use serde::{Deserialize, Serialize};

/// A question/answer pair attached to a business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// A business record from the directory.
///
/// Records are immutable snapshots: the engine fetches one per lookup
/// and never writes back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Business {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub phone: String,
    /// Structured opening hours (e.g. "Sun-Thu 09:00-17:00").
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    /// Tenant-authored system prompt template. May contain `{name}`
    /// style placeholders that are substituted before use.
    #[serde(default)]
    pub prompt_template: Option<String>,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: String,
}
