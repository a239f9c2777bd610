//! Keyword intent engine
//!
//! Scores a query against every training example:
//! - exact token match: 1.0
//! - example contained as a contiguous token run: above 0.8, higher the
//!   more of the query its literal words cover
//! - otherwise word overlap ratio scaled by 0.8
//!
//! Named entity matches (page names) are units: an example must say all of
//! a matched page name or none of it, so a short page name never matches
//! inside a longer one. A placeholder only matches a query word outside
//! every entity match that is not a stopword or a word the model was trained
//! on, and that fits the param's pattern.
//!
//! The best-scoring example decides the intent; ties go to the earliest
//! training example. When the winner matched exactly or as a contained run,
//! its placeholders bind the aligned query words as regex entities.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use site_assistant_core::{
    EntityKind, ExtractedEntity, Inference, NamedEntity, TrainingCorpus, UNRECOGNIZED_INTENT,
};
use site_assistant_config::constants::SLOT_STOPWORDS;

use super::entities::EntityMatcher;
use super::tokens::{tokenize_pattern, tokenize_query, PatternToken, QueryToken};
use super::{IntentEngine, IntentModel};
use crate::NluError;

/// Format tag written into every artifact
pub const ARTIFACT_FORMAT: &str = "keyword";
/// Artifact layout version
pub const ARTIFACT_VERSION: u32 = 1;

const EXACT_SCORE: f32 = 1.0;
const CONTAINS_FLOOR: f32 = 0.8;
const CONTAINS_RANGE: f32 = 0.15;
const OVERLAP_WEIGHT: f32 = 0.8;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Artifact {
    format: String,
    version: u32,
    examples: Vec<Example>,
    #[serde(default)]
    named_entities: Vec<NamedEntity>,
    #[serde(default)]
    regex_entities: BTreeMap<String, String>,
    #[serde(default)]
    answers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Example {
    intent: String,
    tokens: Vec<PatternToken>,
}

impl Example {
    fn words(&self) -> HashSet<&str> {
        self.tokens
            .iter()
            .filter_map(|t| match t {
                PatternToken::Word(w) => Some(w.as_str()),
                PatternToken::Slot(_) => None,
            })
            .collect()
    }

    fn slot_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| matches!(t, PatternToken::Slot(_)))
            .count()
    }
}

/// Engine producing [`KeywordModel`]s
#[derive(Debug, Clone)]
pub struct KeywordEngine {
    min_confidence: f32,
}

impl KeywordEngine {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }
}

impl Default for KeywordEngine {
    fn default() -> Self {
        Self::new(site_assistant_config::constants::DEFAULT_MIN_CONFIDENCE)
    }
}

#[async_trait]
impl IntentEngine for KeywordEngine {
    fn name(&self) -> &str {
        ARTIFACT_FORMAT
    }

    async fn train(&self, corpus: &TrainingCorpus) -> Result<Vec<u8>, NluError> {
        let examples: Vec<Example> = corpus
            .utterances
            .iter()
            .map(|u| Example {
                intent: u.intent.clone(),
                tokens: tokenize_pattern(&u.utterance),
            })
            .filter(|e| !e.tokens.is_empty())
            .collect();

        let artifact = Artifact {
            format: ARTIFACT_FORMAT.to_string(),
            version: ARTIFACT_VERSION,
            examples,
            named_entities: corpus.named_entities.clone(),
            regex_entities: corpus.regex_entities.clone(),
            answers: corpus.answers.clone(),
        };

        // compile once so a bad pattern fails training, not the first query
        KeywordModel::compile(artifact.clone(), self.min_confidence)
            .map_err(|e| NluError::Training(e.to_string()))?;

        tracing::debug!(
            examples = artifact.examples.len(),
            intents = corpus.intents().len(),
            "Trained keyword model"
        );

        serde_json::to_vec(&artifact).map_err(|e| NluError::Training(e.to_string()))
    }

    fn load(&self, artifact: &[u8]) -> Result<Arc<dyn IntentModel>, NluError> {
        let artifact: Artifact =
            serde_json::from_slice(artifact).map_err(|e| NluError::Artifact(e.to_string()))?;

        if artifact.format != ARTIFACT_FORMAT || artifact.version != ARTIFACT_VERSION {
            return Err(NluError::Artifact(format!(
                "unsupported artifact {} v{}",
                artifact.format, artifact.version
            )));
        }

        Ok(Arc::new(KeywordModel::compile(artifact, self.min_confidence)?))
    }
}

/// Query tokens with the entity match each one falls in
struct AnalyzedQuery<'a> {
    tokens: Vec<QueryToken<'a>>,
    /// Token range `[start, end)` of the enclosing entity match
    spans: Vec<Option<(usize, usize)>>,
}

impl<'a> AnalyzedQuery<'a> {
    fn new(tokens: Vec<QueryToken<'a>>, entities: &[ExtractedEntity]) -> Self {
        let mut spans = vec![None; tokens.len()];

        for entity in entities {
            let mut inside = tokens
                .iter()
                .enumerate()
                .filter(|(_, t)| t.start >= entity.start && t.end <= entity.end)
                .map(|(i, _)| i);

            if let Some(first) = inside.next() {
                let last = inside.last().unwrap_or(first);
                for span in &mut spans[first..=last] {
                    *span = Some((first, last + 1));
                }
            }
        }

        Self { tokens, spans }
    }

    fn len(&self) -> usize {
        self.tokens.len()
    }
}

/// Loaded keyword model
pub struct KeywordModel {
    examples: Vec<Example>,
    answers: BTreeMap<String, Vec<String>>,
    slot_patterns: HashMap<String, Regex>,
    entities: EntityMatcher,
    /// Every literal word of every example
    vocabulary: HashSet<String>,
    min_confidence: f32,
}

impl KeywordModel {
    fn compile(artifact: Artifact, min_confidence: f32) -> Result<Self, NluError> {
        let mut slot_patterns = HashMap::with_capacity(artifact.regex_entities.len());
        for (name, pattern) in &artifact.regex_entities {
            let anchored = format!("^(?:{})$", pattern);
            let regex = Regex::new(&anchored)
                .map_err(|e| NluError::Artifact(format!("regex entity {:?}: {}", name, e)))?;
            slot_patterns.insert(name.clone(), regex);
        }

        let vocabulary = artifact
            .examples
            .iter()
            .flat_map(|e| e.words())
            .map(str::to_string)
            .collect();

        Ok(Self {
            entities: EntityMatcher::compile(&artifact.named_entities)?,
            examples: artifact.examples,
            answers: artifact.answers,
            slot_patterns,
            vocabulary,
            min_confidence,
        })
    }

    /// Whether the query word at `index` could be a param value at all
    fn fillable(&self, query: &AnalyzedQuery<'_>, index: usize) -> bool {
        let word = query.tokens[index].lower.as_str();
        query.spans[index].is_none()
            && !self.vocabulary.contains(word)
            && !SLOT_STOPWORDS.contains(&word)
    }

    fn slot_accepts(&self, name: &str, query: &AnalyzedQuery<'_>, index: usize) -> bool {
        self.fillable(query, index)
            && self
                .slot_patterns
                .get(name)
                .map_or(true, |re| re.is_match(query.tokens[index].raw))
    }

    /// Whether `pattern` matches the query run starting at `offset`
    ///
    /// An entity match touched by the run must lie entirely inside it.
    fn matches_at(
        &self,
        pattern: &[PatternToken],
        query: &AnalyzedQuery<'_>,
        offset: usize,
    ) -> bool {
        let end = offset + pattern.len();
        if end > query.len() {
            return false;
        }

        pattern.iter().enumerate().all(|(i, token)| {
            let index = offset + i;
            let whole_span = query.spans[index].map_or(true, |(s, e)| s >= offset && e <= end);

            whole_span
                && match token {
                    PatternToken::Word(word) => *word == query.tokens[index].lower,
                    PatternToken::Slot(name) => self.slot_accepts(name, query, index),
                }
        })
    }

    /// Score and, for aligned matches, the offset the example matched at
    fn score(&self, example: &Example, query: &AnalyzedQuery<'_>) -> (f32, Option<usize>) {
        let tokens = &example.tokens;
        let len = query.len();

        if tokens.len() == len && self.matches_at(tokens, query, 0) {
            return (EXACT_SCORE, Some(0));
        }

        let literal = tokens
            .iter()
            .filter(|t| matches!(t, PatternToken::Word(_)))
            .count();
        if literal > 0 && tokens.len() < len {
            if let Some(offset) =
                (0..=len - tokens.len()).find(|&offset| self.matches_at(tokens, query, offset))
            {
                let coverage = literal as f32 / len as f32;
                return (CONTAINS_FLOOR + CONTAINS_RANGE * coverage, Some(offset));
            }
        }

        (self.overlap(example, query), None)
    }

    fn overlap(&self, example: &Example, query: &AnalyzedQuery<'_>) -> f32 {
        let words = example.words();

        let said: Vec<bool> = query
            .tokens
            .iter()
            .map(|t| words.contains(t.lower.as_str()))
            .collect();
        // a partially said entity match counts for nothing
        let covered: Vec<bool> = (0..query.len())
            .map(|i| match query.spans[i] {
                Some((s, e)) => said[s..e].iter().all(|&c| c),
                None => said[i],
            })
            .collect();

        let matched: HashSet<&str> = query
            .tokens
            .iter()
            .zip(&covered)
            .filter(|(_, covered)| **covered)
            .map(|(t, _)| t.lower.as_str())
            .collect();
        if matched.is_empty() {
            return 0.0;
        }

        let slots = example.slot_count();
        let spare = (0..query.len())
            .filter(|&i| !covered[i] && self.fillable(query, i))
            .count();
        let filled = slots.min(spare);

        (matched.len() + filled) as f32 / (words.len() + slots).max(1) as f32 * OVERLAP_WEIGHT
    }

    /// Bind each placeholder to the query word it was aligned with
    fn bind_slots(
        &self,
        example: &Example,
        query: &AnalyzedQuery<'_>,
        offset: usize,
    ) -> Vec<ExtractedEntity> {
        example
            .tokens
            .iter()
            .enumerate()
            .filter_map(|(i, token)| match token {
                PatternToken::Slot(name) => query.tokens.get(offset + i).map(|t| (name, t)),
                PatternToken::Word(_) => None,
            })
            .map(|(name, token)| ExtractedEntity {
                entity: name.clone(),
                option: None,
                source_text: token.raw.to_string(),
                start: token.start,
                end: token.end,
                accuracy: 1.0,
                kind: EntityKind::Regex,
            })
            .collect()
    }
}

impl IntentModel for KeywordModel {
    fn process(&self, query: &str) -> Inference {
        let mut entities = self.entities.extract(query);
        let analyzed = AnalyzedQuery::new(tokenize_query(query), &entities);

        let mut best: Option<(&Example, f32, Option<usize>)> = None;
        if !analyzed.tokens.is_empty() {
            for example in &self.examples {
                let (score, offset) = self.score(example, &analyzed);
                if score > best.map_or(0.0, |(_, s, _)| s) {
                    best = Some((example, score, offset));
                }
                if score >= EXACT_SCORE {
                    break;
                }
            }
        }

        let Some((example, score, offset)) = best.filter(|(_, s, _)| *s >= self.min_confidence)
        else {
            return Inference {
                intent: UNRECOGNIZED_INTENT.to_string(),
                score: best.map_or(0.0, |(_, s, _)| s),
                entities,
                answer: None,
            };
        };

        if let Some(offset) = offset {
            entities.extend(self.bind_slots(example, &analyzed, offset));
            entities.sort_by_key(|e| e.start);
        }

        Inference {
            intent: example.intent.clone(),
            score,
            entities,
            answer: self
                .answers
                .get(&example.intent)
                .and_then(|answers| answers.first().cloned()),
        }
    }
}
