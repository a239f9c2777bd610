//! Training corpus handed to the intent engine

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One labeled training example
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledUtterance {
    /// Utterance text; may contain `:param` placeholders
    pub utterance: String,
    /// Intent label
    pub intent: String,
}

/// Canonical value of a named entity with its accepted surface forms
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityOption {
    pub value: String,
    pub synonyms: Vec<String>,
}

/// Enumerated entity (e.g. `page`)
///
/// Options keep registration order; the engine matches surface forms in this
/// order, so earlier (longer) options take precedence on overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedEntity {
    pub name: String,
    pub options: Vec<EntityOption>,
}

/// Synthesized training data for one site
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingCorpus {
    pub utterances: Vec<LabeledUtterance>,
    pub named_entities: Vec<NamedEntity>,
    /// Entity name -> regex pattern
    pub regex_entities: BTreeMap<String, String>,
    /// Intent label -> answers, in registration order
    pub answers: BTreeMap<String, Vec<String>>,
}

impl TrainingCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a training example
    pub fn add_document(&mut self, utterance: impl Into<String>, intent: impl Into<String>) {
        self.utterances.push(LabeledUtterance {
            utterance: utterance.into(),
            intent: intent.into(),
        });
    }

    /// Register an option of a named entity
    ///
    /// Registering the same value twice merges the synonym lists.
    pub fn add_named_entity_text(&mut self, entity: &str, value: &str, synonyms: &[String]) {
        let index = match self.named_entities.iter().position(|e| e.name == entity) {
            Some(index) => index,
            None => {
                self.named_entities.push(NamedEntity {
                    name: entity.to_string(),
                    options: Vec::new(),
                });
                self.named_entities.len() - 1
            }
        };
        let named = &mut self.named_entities[index];

        match named.options.iter_mut().find(|o| o.value == value) {
            Some(option) => {
                for synonym in synonyms {
                    if !option.synonyms.contains(synonym) {
                        option.synonyms.push(synonym.clone());
                    }
                }
            }
            None => named.options.push(EntityOption {
                value: value.to_string(),
                synonyms: synonyms.to_vec(),
            }),
        }
    }

    /// Register a regex entity; re-registering an existing name is a no-op
    pub fn add_regex_entity(&mut self, entity: &str, pattern: &str) {
        self.regex_entities
            .entry(entity.to_string())
            .or_insert_with(|| pattern.to_string());
    }

    /// Append an answer for an intent
    pub fn add_answer(&mut self, intent: &str, answer: impl Into<String>) {
        self.answers
            .entry(intent.to_string())
            .or_default()
            .push(answer.into());
    }

    /// Examples labeled with `intent`
    pub fn utterances_for<'a>(&'a self, intent: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.utterances
            .iter()
            .filter(move |u| u.intent == intent)
            .map(|u| u.utterance.as_str())
    }

    /// Distinct intent labels in first-seen order
    pub fn intents(&self) -> Vec<&str> {
        let mut intents: Vec<&str> = Vec::new();
        for u in &self.utterances {
            if !intents.contains(&u.intent.as_str()) {
                intents.push(&u.intent);
            }
        }
        intents
    }

    pub fn named_entity(&self, name: &str) -> Option<&NamedEntity> {
        self.named_entities.iter().find(|e| e.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entity_registration_merges() {
        let mut corpus = TrainingCorpus::new();
        corpus.add_named_entity_text("page", "claims", &["claims".to_string()]);
        corpus.add_named_entity_text("page", "claims", &["my claims".to_string()]);
        corpus.add_named_entity_text("page", "dashboard", &["dashboard".to_string()]);

        let page = corpus.named_entity("page").unwrap();
        assert_eq!(page.options.len(), 2);
        assert_eq!(page.options[0].synonyms, vec!["claims", "my claims"]);
    }

    #[test]
    fn test_regex_entity_registration_is_idempotent() {
        let mut corpus = TrainingCorpus::new();
        corpus.add_regex_entity("claimId", r"\w+");
        corpus.add_regex_entity("claimId", r"\d+");
        assert_eq!(corpus.regex_entities.len(), 1);
        assert_eq!(corpus.regex_entities["claimId"], r"\w+");
    }

    #[test]
    fn test_intents_in_first_seen_order() {
        let mut corpus = TrainingCorpus::new();
        corpus.add_document("hi", "greet");
        corpus.add_document("go to claims", "navigate_to_page");
        corpus.add_document("hello", "greet");

        assert_eq!(corpus.intents(), vec!["greet", "navigate_to_page"]);
        assert_eq!(corpus.utterances_for("greet").count(), 2);
    }
}
