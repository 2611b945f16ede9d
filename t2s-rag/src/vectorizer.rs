//! TF-IDF vectorization with an explicit fit/transform split.
//!
//! [`TfidfVectorizer::fit`] is the only way to obtain a vectorizer, and it
//! returns an immutable value: the vocabulary and IDF weights are frozen at fit
//! time. [`TfidfVectorizer::transform`] projects any text onto that frozen
//! vocabulary; terms that were not seen during fitting contribute nothing.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::IndexConfig;
use crate::error::{RagError, Result};
use crate::stopwords::is_stop_word;

// Two or more word characters; CJK runs count as a single token.
static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"));

/// A fitted TF-IDF vectorizer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TfidfVectorizer {
    config: IndexConfig,
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit a vocabulary and IDF weights on `texts`.
    ///
    /// Up to `config.max_features` terms are kept, preferring terms with the
    /// highest document frequency (ties go to the higher total count, then to
    /// the lexicographically smaller term). Kept terms are numbered in
    /// lexicographic order. IDF is smoothed: `ln((1 + n) / (1 + df)) + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for an invalid config and
    /// [`RagError::EmptyVocabulary`] if no text yields a single term.
    pub fn fit<S: AsRef<str>>(texts: &[S], config: &IndexConfig) -> Result<Self> {
        config.validate()?;

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_count: HashMap<String, usize> = HashMap::new();
        for text in texts {
            let mut seen = HashSet::new();
            for term in analyze(text.as_ref(), config) {
                *total_count.entry(term.clone()).or_default() += 1;
                if seen.insert(term.clone()) {
                    *doc_freq.entry(term).or_default() += 1;
                }
            }
        }

        if doc_freq.is_empty() {
            return Err(RagError::EmptyVocabulary);
        }

        let mut ranked: Vec<(String, usize)> = doc_freq.into_iter().collect();
        ranked.sort_by(|(term_a, df_a), (term_b, df_b)| {
            df_b.cmp(df_a)
                .then_with(|| total_count[term_b].cmp(&total_count[term_a]))
                .then_with(|| term_a.cmp(term_b))
        });
        ranked.truncate(config.max_features);
        ranked.sort_by(|(a, _), (b, _)| a.cmp(b));

        let n_docs = texts.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(ranked.len());
        for (index, (term, df)) in ranked.into_iter().enumerate() {
            idf.push(((1.0 + n_docs) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { config: config.clone(), vocabulary, idf })
    }

    /// Project `text` onto the fitted vocabulary as an L2-normalized TF-IDF vector.
    ///
    /// The result has length [`dimensions`](Self::dimensions). A text with no
    /// in-vocabulary terms maps to the zero vector.
    pub fn transform(&self, text: &str) -> Vec<f64> {
        let mut vector = vec![0.0; self.idf.len()];
        for term in analyze(text, &self.config) {
            if let Some(&index) = self.vocabulary.get(&term) {
                vector[index] += 1.0;
            }
        }
        for (weight, idf) in vector.iter_mut().zip(&self.idf) {
            *weight *= idf;
        }
        let norm = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        if norm > 0.0 {
            for weight in &mut vector {
                *weight /= norm;
            }
        }
        vector
    }

    /// Number of vocabulary terms, i.e. the length of every produced vector.
    pub fn dimensions(&self) -> usize {
        self.idf.len()
    }

    /// Term to dimension mapping.
    pub fn vocabulary(&self) -> &BTreeMap<String, usize> {
        &self.vocabulary
    }

    /// IDF weight per dimension.
    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    /// The config the vectorizer was fitted with.
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Check that a deserialized vectorizer is internally consistent.
    pub(crate) fn check_consistency(&self) -> Result<()> {
        let dims = self.idf.len();
        let mut indices: Vec<usize> = self.vocabulary.values().copied().collect();
        indices.sort_unstable();
        let dense = indices.iter().enumerate().all(|(expected, &actual)| expected == actual);
        if self.vocabulary.len() != dims || !dense {
            return Err(RagError::IncompatibleFormat {
                found: format!("{} vocabulary terms for {dims} idf weights", self.vocabulary.len()),
                expected: "one dense dimension per vocabulary term".to_string(),
            });
        }
        Ok(())
    }
}

/// Split `text` into the terms the vectorizer counts: word tokens with stop
/// words removed, expanded into the configured n-grams.
pub fn analyze(text: &str, config: &IndexConfig) -> Vec<String> {
    let text = if config.lowercase { text.to_lowercase() } else { text.to_string() };
    let tokens: Vec<&str> = TOKEN_PATTERN
        .find_iter(&text)
        .map(|m| m.as_str())
        .filter(|token| !config.stop_words || !is_stop_word(token))
        .collect();

    let (min_n, max_n) = config.ngram_range;
    let mut terms = Vec::new();
    for n in min_n..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_builds_unigrams_then_bigrams() {
        let terms = analyze("The actor.first_name: 名字", &IndexConfig::default());
        assert_eq!(
            terms,
            vec!["actor", "first_name", "名字", "actor first_name", "first_name 名字"]
        );
    }

    #[test]
    fn analyze_drops_single_character_tokens() {
        let config = IndexConfig::builder().ngram_range(1, 1).build().unwrap();
        assert_eq!(analyze("a b cd", &config), vec!["cd"]);
    }

    #[test]
    fn fit_orders_vocabulary_lexicographically() {
        let config = IndexConfig::builder().ngram_range(1, 1).build().unwrap();
        let vectorizer = TfidfVectorizer::fit(&["film title", "actor film"], &config).unwrap();
        let terms: Vec<_> = vectorizer.vocabulary().iter().map(|(t, i)| (t.as_str(), *i)).collect();
        assert_eq!(terms, vec![("actor", 0), ("film", 1), ("title", 2)]);
        // df(film) = 2 of 2 documents
        assert!((vectorizer.idf()[1] - 1.0).abs() < 1e-12);
        assert!(vectorizer.idf()[0] > vectorizer.idf()[1]);
    }

    #[test]
    fn max_features_keeps_most_frequent_terms() {
        let config = IndexConfig::builder().ngram_range(1, 1).max_features(1).build().unwrap();
        let vectorizer =
            TfidfVectorizer::fit(&["rental date", "rental rate", "film"], &config).unwrap();
        assert_eq!(vectorizer.dimensions(), 1);
        assert!(vectorizer.vocabulary().contains_key("rental"));
    }

    #[test]
    fn transform_is_unit_length_or_zero() {
        let vectorizer =
            TfidfVectorizer::fit(&["customer email", "store address"], &IndexConfig::default())
                .unwrap();
        let v = vectorizer.transform("customer email address");
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-12);

        let unknown = vectorizer.transform("payment amount");
        assert!(unknown.iter().all(|x| *x == 0.0));
    }

    #[test]
    fn stop_word_only_corpus_has_no_vocabulary() {
        let err = TfidfVectorizer::fit(&["the of and", "from where"], &IndexConfig::default())
            .unwrap_err();
        assert!(matches!(err, RagError::EmptyVocabulary));
    }
}
