//! Named entity extraction by surface form

use regex::Regex;
use site_assistant_core::{EntityKind, ExtractedEntity, NamedEntity};

use crate::NluError;

struct SurfaceForm {
    entity: String,
    option: String,
    regex: Regex,
}

/// Case-insensitive, word-bounded matcher over every option synonym
///
/// Longer matches win over shorter overlapping ones; equal lengths go to
/// the form registered first.
pub struct EntityMatcher {
    forms: Vec<SurfaceForm>,
}

impl EntityMatcher {
    pub fn compile(entities: &[NamedEntity]) -> Result<Self, NluError> {
        let mut forms = Vec::new();

        for entity in entities {
            for option in &entity.options {
                for synonym in &option.synonyms {
                    let text = synonym.trim();
                    if text.is_empty() {
                        continue;
                    }

                    let pattern = format!(r"(?i)\b{}\b", regex::escape(text));
                    let regex = Regex::new(&pattern).map_err(|e| {
                        NluError::Artifact(format!("entity {:?}: {}", entity.name, e))
                    })?;

                    forms.push(SurfaceForm {
                        entity: entity.name.clone(),
                        option: option.value.clone(),
                        regex,
                    });
                }
            }
        }

        Ok(Self { forms })
    }

    /// Non-overlapping entity matches ordered by position
    pub fn extract(&self, query: &str) -> Vec<ExtractedEntity> {
        let mut candidates: Vec<(usize, usize, usize)> = Vec::new();
        for (index, form) in self.forms.iter().enumerate() {
            for m in form.regex.find_iter(query) {
                candidates.push((index, m.start(), m.end()));
            }
        }

        candidates.sort_by(|a, b| {
            (b.2 - b.1)
                .cmp(&(a.2 - a.1))
                .then(a.0.cmp(&b.0))
                .then(a.1.cmp(&b.1))
        });

        let mut accepted: Vec<ExtractedEntity> = Vec::new();
        for (index, start, end) in candidates {
            if accepted.iter().any(|e| start < e.end && e.start < end) {
                continue;
            }

            let form = &self.forms[index];
            accepted.push(ExtractedEntity {
                entity: form.entity.clone(),
                option: Some(form.option.clone()),
                source_text: query[start..end].to_string(),
                start,
                end,
                accuracy: 1.0,
                kind: EntityKind::Enum,
            });
        }

        accepted.sort_by_key(|e| e.start);
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use site_assistant_core::TrainingCorpus;

    fn matcher() -> EntityMatcher {
        let mut corpus = TrainingCorpus::new();
        corpus.add_named_entity_text(
            "page",
            "Claims Detail",
            &["Claims Detail".to_string(), "claim info".to_string()],
        );
        corpus.add_named_entity_text("page", "Claims", &["Claims".to_string()]);
        EntityMatcher::compile(&corpus.named_entities).unwrap()
    }

    #[test]
    fn test_longest_match_wins() {
        let found = matcher().extract("open claims detail please");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].option.as_deref(), Some("Claims Detail"));
        assert_eq!(found[0].source_text, "claims detail");
        assert_eq!((found[0].start, found[0].end), (5, 18));
    }

    #[test]
    fn test_synonym_maps_to_canonical() {
        let found = matcher().extract("Show CLAIM INFO");
        assert_eq!(found[0].option.as_deref(), Some("Claims Detail"));
    }

    #[test]
    fn test_word_boundaries_respected() {
        assert!(matcher().extract("reclaimsdetail").is_empty());
    }

    #[test]
    fn test_multiple_matches_in_order() {
        let found = matcher().extract("claims then claim info");
        let options: Vec<_> = found.iter().filter_map(|e| e.option.as_deref()).collect();
        assert_eq!(options, vec!["Claims", "Claims Detail"]);
    }
}
