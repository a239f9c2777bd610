//! Site metadata submitted by operators
//!
//! A site is a set of navigable pages plus free-form routing intents. Pages are
//! treated as immutable input: anything derived from them (normalized names,
//! params extracted from the URL template) lives on [`ResolvedPage`].

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `:param` placeholders inside a page URL template
static URL_PARAM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r":([A-Za-z0-9_]+)").expect("URL param pattern is valid")
});

/// Validated site identifier
///
/// Site ids become file names, so only ASCII letters, digits, `-` and `_`
/// are accepted. Distinct ids therefore always map to distinct paths and
/// can never escape the storage directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SiteId(String);

impl SiteId {
    /// Maximum accepted length
    pub const MAX_LEN: usize = 128;

    /// Validate and wrap a raw site id
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();

        if raw.is_empty() {
            return Err(Error::Validation("siteId must not be empty".to_string()));
        }

        if raw.len() > Self::MAX_LEN {
            return Err(Error::Validation(format!(
                "siteId must be at most {} characters",
                Self::MAX_LEN
            )));
        }

        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(Error::Validation(format!(
                "siteId contains invalid character {:?}; allowed: letters, digits, '-', '_'",
                bad
            )));
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SiteId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SiteId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SiteId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<SiteId> for String {
    fn from(id: SiteId) -> Self {
        id.0
    }
}

/// A navigable page of a site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page name, unique within a site; may be dotted (e.g. "claims.detail")
    pub name: String,
    /// Alternative names users may say
    #[serde(
        default,
        deserialize_with = "crate::lenient::list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub synonyms: Vec<String>,
    /// URL template with `:param` placeholders
    #[serde(
        default,
        deserialize_with = "crate::lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub url: Option<String>,
    /// Explicit parameter list; derived from `url` when absent
    #[serde(
        default,
        deserialize_with = "crate::lenient::or_default",
        skip_serializing_if = "Option::is_none"
    )]
    pub params: Option<Vec<String>>,
    /// Fields the assistant does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Page {
    /// Create a page with just a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            synonyms: Vec::new(),
            url: None,
            params: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_params<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Effective parameter list
    ///
    /// Explicit `params` win (an explicit empty list means "no params").
    /// Otherwise every `:name` token of `url` is taken in order of first
    /// appearance, without duplicates.
    pub fn effective_params(&self) -> Vec<String> {
        if let Some(params) = &self.params {
            return params.clone();
        }

        let Some(url) = &self.url else {
            return Vec::new();
        };

        let mut params: Vec<String> = Vec::new();
        for caps in URL_PARAM.captures_iter(url) {
            let name = &caps[1];
            if !params.iter().any(|p| p == name) {
                params.push(name.to_string());
            }
        }
        params
    }

    /// Derived, normalized view used for corpus synthesis
    pub fn resolve(&self) -> ResolvedPage {
        ResolvedPage::from(self)
    }
}

/// Replace path-separator dots with spaces so names read as words
pub fn normalize_page_name(name: &str) -> String {
    name.replace('.', " ")
}

/// A page with derived fields filled in
///
/// Built from a borrowed [`Page`]; the caller's data is never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPage {
    /// Original name, used for length ordering
    pub raw_name: String,
    /// Name with dots replaced by spaces
    pub name: String,
    /// Normalized synonyms (duplicates and copies of `name` removed)
    pub synonyms: Vec<String>,
    /// Effective params
    pub params: Vec<String>,
}

impl ResolvedPage {
    /// Normalized name followed by every normalized synonym
    pub fn surface_forms(&self) -> Vec<String> {
        std::iter::once(self.name.clone())
            .chain(self.synonyms.iter().cloned())
            .collect()
    }
}

impl From<&Page> for ResolvedPage {
    fn from(page: &Page) -> Self {
        let name = normalize_page_name(&page.name);

        let mut synonyms: Vec<String> = Vec::with_capacity(page.synonyms.len());
        for synonym in &page.synonyms {
            let normalized = normalize_page_name(synonym);
            if normalized != name && !synonyms.contains(&normalized) {
                synonyms.push(normalized);
            }
        }

        Self {
            raw_name: page.name.clone(),
            name,
            synonyms,
            params: page.effective_params(),
        }
    }
}

/// Structured description of a site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Navigable pages, in operator order; entries without a name are skipped
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub pages: Vec<Page>,
    /// Fields the assistant does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SiteMetadata {
    pub fn with_pages(pages: Vec<Page>) -> Self {
        Self {
            pages,
            extra: serde_json::Map::new(),
        }
    }
}

/// Operator-defined intent with example phrases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingIntent {
    /// Intent label
    pub name: String,
    /// Example utterances
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub phrases: Vec<String>,
}

/// Everything stored for one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteRecord {
    #[serde(default, deserialize_with = "crate::lenient::list")]
    pub routing_intents: Vec<RoutingIntent>,
    #[serde(default, deserialize_with = "crate::lenient::or_default")]
    pub site_metadata: SiteMetadata,
}
