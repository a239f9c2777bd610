//! Training corpus synthesis
//!
//! Expands structured site metadata into labeled navigation utterances,
//! registers `page` and param entities, and adds knowledge base concepts
//! with their answers. Pure and deterministic: the same inputs always
//! produce the same corpus in the same order.

use std::collections::BTreeMap;

use site_assistant_config::constants::{
    NAVIGATION_TEMPLATES, PAGE_PLACEHOLDER, PARAM_ENTITY_PATTERN, PARAM_KEYWORDS,
};
use site_assistant_config::NluConfig;
use site_assistant_core::{
    ResolvedPage, RoutingIntent, SiteMetadata, SiteRecord, TrainingCorpus, NAVIGATE_INTENT,
};
use site_assistant_knowledge::KnowledgeBase;

/// Name of the named entity holding canonical page names
pub const PAGE_ENTITY: &str = "page";

/// Templates and param aliases used for expansion
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisOptions {
    /// Navigation templates, each containing `%page%`
    pub templates: Vec<String>,
    /// Param name -> spoken aliases
    pub param_keywords: BTreeMap<String, Vec<String>>,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            templates: NAVIGATION_TEMPLATES.iter().map(|t| t.to_string()).collect(),
            param_keywords: PARAM_KEYWORDS
                .iter()
                .map(|(param, aliases)| {
                    (
                        param.to_string(),
                        aliases.iter().map(|a| a.to_string()).collect(),
                    )
                })
                .collect(),
        }
    }
}

impl From<&NluConfig> for SynthesisOptions {
    fn from(config: &NluConfig) -> Self {
        Self {
            templates: config.templates.clone(),
            param_keywords: config.param_keywords.clone(),
        }
    }
}

impl SynthesisOptions {
    /// Aliases for `param`, falling back to the param name itself
    ///
    /// Lookup ignores ASCII case since config files may lowercase map keys.
    fn keywords_for(&self, param: &str) -> Vec<String> {
        if let Some(aliases) = self.param_keywords.get(param) {
            return aliases.clone();
        }

        self.param_keywords
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(param))
            .map(|(_, aliases)| aliases.clone())
            .unwrap_or_else(|| vec![param.to_string()])
    }
}

/// Builds a [`TrainingCorpus`] for one site
#[derive(Debug, Clone, Default)]
pub struct CorpusSynthesizer {
    options: SynthesisOptions,
}

impl CorpusSynthesizer {
    pub fn new(options: SynthesisOptions) -> Self {
        Self { options }
    }

    /// Synthesize the corpus for a stored site record
    pub fn synthesize_record(&self, record: &SiteRecord, kb: &KnowledgeBase) -> TrainingCorpus {
        self.synthesize(&record.routing_intents, &record.site_metadata, kb)
    }

    pub fn synthesize(
        &self,
        routing_intents: &[RoutingIntent],
        metadata: &SiteMetadata,
        kb: &KnowledgeBase,
    ) -> TrainingCorpus {
        let mut corpus = TrainingCorpus::new();

        for intent in routing_intents {
            for phrase in &intent.phrases {
                corpus.add_document(phrase.as_str(), intent.name.as_str());
            }
        }

        for page in Self::pages_longest_first(metadata) {
            self.add_page(&mut corpus, &page);
        }

        Self::add_concepts(&mut corpus, kb);

        tracing::debug!(
            utterances = corpus.utterances.len(),
            pages = metadata.pages.len(),
            concepts = kb.len(),
            "Synthesized training corpus"
        );

        corpus
    }

    /// Resolved pages, longest raw name first, ties in input order
    fn pages_longest_first(metadata: &SiteMetadata) -> Vec<ResolvedPage> {
        let mut pages: Vec<ResolvedPage> = metadata.pages.iter().map(ResolvedPage::from).collect();
        pages.sort_by(|a, b| b.raw_name.chars().count().cmp(&a.raw_name.chars().count()));
        pages
    }

    fn add_page(&self, corpus: &mut TrainingCorpus, page: &ResolvedPage) {
        for form in page.surface_forms() {
            for template in &self.options.templates {
                corpus.add_document(fill(template, &form), NAVIGATE_INTENT);
            }
        }

        for utterance in self.param_utterances(page) {
            corpus.add_document(utterance, NAVIGATE_INTENT);
        }

        corpus.add_named_entity_text(PAGE_ENTITY, &page.name, &page.surface_forms());

        for param in &page.params {
            corpus.add_regex_entity(param, PARAM_ENTITY_PATTERN);
        }
    }

    fn param_utterances(&self, page: &ResolvedPage) -> Vec<String> {
        if page.params.is_empty() {
            return Vec::new();
        }

        let mut utterances = Vec::new();

        for param in &page.params {
            for keyword in self.options.keywords_for(param) {
                for template in &self.options.templates {
                    let base = fill(template, &page.name);
                    utterances.push(format!("{} with {} :{}", base, keyword, param));
                    utterances.push(format!("{} {} :{}", base, keyword, param));
                }
            }
        }

        let direct = page
            .params
            .iter()
            .map(|p| format!(":{}", p))
            .collect::<Vec<_>>()
            .join(" ");

        for template in &self.options.templates {
            utterances.push(format!("{} {}", fill(template, &page.name), direct));
        }
        utterances.push(format!("{} {}", page.name, direct));

        utterances
    }

    fn add_concepts(corpus: &mut TrainingCorpus, kb: &KnowledgeBase) {
        for (key, concept) in kb.iter() {
            let label = key.intent_label();

            for example in &concept.intent_examples {
                corpus.add_document(example.as_str(), label.as_str());
            }

            for answer in concept.answers() {
                corpus.add_answer(&label, answer);
            }
        }
    }
}

fn fill(template: &str, page: &str) -> String {
    template.replace(PAGE_PLACEHOLDER, page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_assistant_core::{Concept, FaqEntry, Page};

    fn synthesize(pages: Vec<Page>) -> TrainingCorpus {
        CorpusSynthesizer::default().synthesize(
            &[],
            &SiteMetadata::with_pages(pages),
            &KnowledgeBase::empty(),
        )
    }

    fn navigation(corpus: &TrainingCorpus) -> Vec<&str> {
        corpus.utterances_for(NAVIGATE_INTENT).collect()
    }

    #[test]
    fn test_page_without_params_gets_base_templates_only() {
        let corpus = synthesize(vec![Page::new("Dashboard").with_url("/dashboard")]);

        assert_eq!(
            navigation(&corpus),
            vec![
                "go to Dashboard",
                "navigate to Dashboard",
                "open Dashboard page",
                "take me to Dashboard",
                "show me the Dashboard page",
            ]
        );

        let page = corpus.named_entity(PAGE_ENTITY).unwrap();
        assert_eq!(page.options.len(), 1);
        assert_eq!(page.options[0].value, "Dashboard");
        assert_eq!(page.options[0].synonyms, vec!["Dashboard"]);
        assert!(corpus.regex_entities.is_empty());
    }

    #[test]
    fn test_synonyms_are_expanded() {
        let corpus = synthesize(vec![Page::new("Dashboard").with_synonyms(["home", "main.view"])]);
        let utterances = navigation(&corpus);

        assert_eq!(utterances.len(), 15);
        assert!(utterances.contains(&"go to home"));
        assert!(utterances.contains(&"show me the main view page"));

        let page = corpus.named_entity(PAGE_ENTITY).unwrap();
        assert_eq!(page.options[0].synonyms, vec!["Dashboard", "home", "main view"]);
    }

    #[test]
    fn test_longer_pages_are_processed_first() {
        let corpus = synthesize(vec![
            Page::new("Claims"),
            Page::new("Claims Detail"),
            Page::new("Notes"),
            Page::new("Claim"),
        ]);

        assert_eq!(navigation(&corpus)[0], "go to Claims Detail");

        let values: Vec<&str> = corpus
            .named_entity(PAGE_ENTITY)
            .unwrap()
            .options
            .iter()
            .map(|o| o.value.as_str())
            .collect();
        // equal lengths keep input order
        assert_eq!(values, vec!["Claims Detail", "Claims", "Notes", "Claim"]);
    }

    #[test]
    fn test_dots_never_reach_utterances_or_entities() {
        let corpus = synthesize(vec![Page::new("claims.detail")
            .with_synonyms(["claim.info"])
            .with_url("/claims/:claimId")]);

        assert!(corpus.utterances.iter().all(|u| !u.utterance.contains('.')));
        let option = &corpus.named_entity(PAGE_ENTITY).unwrap().options[0];
        assert_eq!(option.value, "claims detail");
        assert!(option.synonyms.iter().all(|s| !s.contains('.')));
    }

    #[test]
    fn test_param_expansion() {
        let corpus = synthesize(vec![Page::new("Claims").with_url("/claims/:claimId/:itemId")]);
        let utterances = navigation(&corpus);

        // 5 base + (3 claim + 2 item aliases) * 5 templates * 2 + 5 direct + 1 bare
        assert_eq!(utterances.len(), 5 + 5 * 5 * 2 + 5 + 1);
        assert!(utterances.contains(&"go to Claims with claim number :claimId"));
        assert!(utterances.contains(&"open Claims page item id :itemId"));
        assert!(utterances.contains(&"take me to Claims :claimId :itemId"));
        assert_eq!(*utterances.last().unwrap(), "Claims :claimId :itemId");

        assert_eq!(corpus.regex_entities.len(), 2);
        assert_eq!(corpus.regex_entities["claimId"], PARAM_ENTITY_PATTERN);
    }

    #[test]
    fn test_explicit_empty_params_suppress_url_params() {
        let corpus = synthesize(vec![Page::new("Claims")
            .with_url("/claims/:claimId")
            .with_params(Vec::<String>::new())]);

        assert_eq!(navigation(&corpus).len(), 5);
        assert!(corpus.regex_entities.is_empty());
    }

    #[test]
    fn test_unknown_param_uses_its_own_name() {
        let corpus = synthesize(vec![Page::new("Reports").with_params(["reportCode"])]);
        assert!(navigation(&corpus).contains(&"go to Reports with reportCode :reportCode"));
    }

    #[test]
    fn test_param_keywords_match_case_insensitively() {
        let mut options = SynthesisOptions::default();
        options.param_keywords = BTreeMap::from([(
            "memberid".to_string(),
            vec!["subscriber".to_string()],
        )]);

        let corpus = CorpusSynthesizer::new(options).synthesize(
            &[],
            &SiteMetadata::with_pages(vec![Page::new("Members").with_params(["memberId"])]),
            &KnowledgeBase::empty(),
        );

        assert!(corpus
            .utterances
            .iter()
            .any(|u| u.utterance == "go to Members with subscriber :memberId"));
    }

    #[test]
    fn test_shared_params_register_one_regex_entity() {
        let corpus = synthesize(vec![
            Page::new("Claims").with_url("/claims/:claimId"),
            Page::new("Claim Notes").with_url("/claims/:claimId/notes"),
        ]);
        assert_eq!(corpus.regex_entities.len(), 1);
    }

    #[test]
    fn test_routing_intents_pass_through() {
        let corpus = CorpusSynthesizer::default().synthesize(
            &[RoutingIntent {
                name: "greeting".to_string(),
                phrases: vec!["hello".to_string(), "good morning".to_string()],
            }],
            &SiteMetadata::default(),
            &KnowledgeBase::empty(),
        );

        assert_eq!(
            corpus.utterances_for("greeting").collect::<Vec<_>>(),
            vec!["hello", "good morning"]
        );
    }

    #[test]
    fn test_concepts_and_answers() {
        let kb = KnowledgeBase::from_concepts(vec![
            (
                "Member ID Lookup".to_string(),
                Concept {
                    description: Some("Look up a member".to_string()),
                    intent_examples: vec!["how do I find a member".to_string()],
                    faq: vec![
                        FaqEntry {
                            question: "Where?".to_string(),
                            answer: "On the card".to_string(),
                        },
                        FaqEntry {
                            question: "How long?".to_string(),
                            answer: "Ten digits".to_string(),
                        },
                    ],
                    ..Default::default()
                },
            ),
            (
                "Copay".to_string(),
                Concept {
                    description: Some("Fixed amount".to_string()),
                    intent_examples: vec!["what is a copay".to_string()],
                    ..Default::default()
                },
            ),
            (
                "Empty".to_string(),
                Concept {
                    description: Some(String::new()),
                    ..Default::default()
                },
            ),
        ])
        .unwrap();

        let corpus =
            CorpusSynthesizer::default().synthesize(&[], &SiteMetadata::default(), &kb);

        assert_eq!(
            corpus.utterances_for("concept.member_id_lookup").collect::<Vec<_>>(),
            vec!["how do I find a member"]
        );
        assert_eq!(
            corpus.answers["concept.member_id_lookup"],
            vec!["On the card", "Ten digits"]
        );
        assert_eq!(corpus.answers["concept.copay"], vec!["Fixed amount"]);
        assert!(!corpus.answers.contains_key("concept.empty"));
    }

    #[test]
    fn test_synthesis_is_deterministic() {
        let pages = vec![
            Page::new("Claims").with_url("/claims/:claimId"),
            Page::new("Members").with_synonyms(["people"]),
        ];
        assert_eq!(synthesize(pages.clone()), synthesize(pages));
    }
}
