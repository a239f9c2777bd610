//! Built-in defaults for corpus synthesis and storage

/// Placeholder replaced with a page name inside navigation templates
pub const PAGE_PLACEHOLDER: &str = "%page%";

/// Navigation templates instantiated for every page name and synonym
pub const NAVIGATION_TEMPLATES: &[&str] = &[
    "go to %page%",
    "navigate to %page%",
    "open %page% page",
    "take me to %page%",
    "show me the %page% page",
];

/// Spoken aliases for common URL parameters
///
/// A param with no entry here is referred to by its own name.
pub const PARAM_KEYWORDS: &[(&str, &[&str])] = &[
    ("memberId", &["member", "member id", "id"]),
    ("policyId", &["policy", "policy id", "policy number"]),
    ("claimId", &["claim", "claim id", "claim number"]),
    ("authId", &["authorization", "auth id"]),
    ("appealId", &["appeal", "appeal id"]),
    ("reviewId", &["review", "review id"]),
    ("attachmentId", &["attachment", "attachment id"]),
    ("auditId", &["audit", "audit id"]),
    ("evidenceId", &["evidence", "evidence id"]),
    ("historyId", &["history", "history id"]),
    ("noteId", &["note", "note id"]),
    ("pharmacyId", &["pharmacy", "pharmacy id"]),
    ("orderId", &["order", "order id"]),
    ("itemId", &["item", "item id"]),
];

/// Pattern registered for every param entity
pub const PARAM_ENTITY_PATTERN: &str = r"\w+";

/// Words a `:param` placeholder never binds as a value
pub const SLOT_STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "at", "by", "for", "from", "i", "in", "is", "it", "me",
    "my", "need", "of", "on", "or", "our", "please", "see", "show", "that", "the", "this", "to",
    "view", "want", "with", "your",
];

/// Confidence below which a query is reported as unrecognized
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Storage locations, relative to the working directory
pub mod paths {
    pub const SITES_DIR: &str = "data/sites";
    pub const MODELS_DIR: &str = "models";
    pub const KNOWLEDGE_BASE: &str = "knowledge/application_knowledge_base.json";
}
