//! In-memory knowledge base

use std::collections::{BTreeMap, HashMap};

use site_assistant_core::{Concept, ConceptKey};

use crate::KnowledgeError;

/// Immutable set of concepts indexed by normalized key
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    /// Raw key -> concept
    concepts: BTreeMap<String, Concept>,
    /// Normalized key -> raw key
    index: HashMap<ConceptKey, String>,
}

impl KnowledgeBase {
    /// Knowledge base with no concepts
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from raw-key/concept pairs
    ///
    /// Fails when two distinct raw keys normalize to the same [`ConceptKey`],
    /// since one of them would silently shadow the other's answers.
    pub fn from_concepts<I>(concepts: I) -> Result<Self, KnowledgeError>
    where
        I: IntoIterator<Item = (String, Concept)>,
    {
        let concepts: BTreeMap<String, Concept> = concepts.into_iter().collect();
        let mut index: HashMap<ConceptKey, String> = HashMap::with_capacity(concepts.len());

        for raw in concepts.keys() {
            let key = ConceptKey::normalize(raw);
            if let Some(first) = index.get(&key) {
                return Err(KnowledgeError::DuplicateConceptKey {
                    key: key.to_string(),
                    first: first.clone(),
                    second: raw.clone(),
                });
            }
            index.insert(key, raw.clone());
        }

        Ok(Self { concepts, index })
    }

    /// Concept whose normalized key equals `key`
    pub fn get(&self, key: &ConceptKey) -> Option<&Concept> {
        self.index.get(key).and_then(|raw| self.concepts.get(raw))
    }

    /// Concepts with their normalized keys, ordered by raw key
    pub fn iter(&self) -> impl Iterator<Item = (ConceptKey, &Concept)> + '_ {
        self.concepts
            .iter()
            .map(|(raw, concept)| (ConceptKey::normalize(raw), concept))
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}
