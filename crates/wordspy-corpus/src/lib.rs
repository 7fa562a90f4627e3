//! The word-pair corpus for Wordspy.
//!
//! A corpus is a fixed, ordered list of (secret word, spy word) pairs. The
//! room core only ever asks it for one pair, picked uniformly at random
//! through an injected [`Rng`] — which is what makes round setup
//! deterministic under a seeded generator in tests.
//!
//! The guarantee that the two words of a pair differ lives HERE, at
//! construction time. Consumers never re-validate it.

use rand::Rng;

/// One secret/spy word pair.
///
/// During a round, every regular player is told `secret` and the spy is
/// told `spy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPair {
    /// The word shared by all non-spy players.
    pub secret: String,
    /// The alternate word held by the spy.
    pub spy: String,
}

impl WordPair {
    /// Creates a pair from two string-like values.
    pub fn new(secret: impl Into<String>, spy: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            spy: spy.into(),
        }
    }
}

/// Errors that can occur while building a corpus.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    /// The corpus has no pairs — nothing to pick from.
    #[error("corpus must contain at least one word pair")]
    Empty,

    /// A pair's two words are blank or identical, which would make the
    /// spy trivially detectable (or undetectable).
    #[error("invalid word pair at index {index}: {reason}")]
    InvalidPair {
        /// Position of the offending pair in the input list.
        index: usize,
        /// What's wrong with it.
        reason: String,
    },
}

/// A validated, ordered list of word pairs.
#[derive(Debug, Clone)]
pub struct WordCorpus {
    pairs: Vec<WordPair>,
}

impl WordCorpus {
    /// Builds a corpus from the given pairs.
    ///
    /// Rejects empty corpora, blank words, and pairs whose two words are
    /// equal (case-insensitively).
    pub fn new(pairs: Vec<WordPair>) -> Result<Self, CorpusError> {
        if pairs.is_empty() {
            return Err(CorpusError::Empty);
        }
        for (index, pair) in pairs.iter().enumerate() {
            if pair.secret.trim().is_empty() || pair.spy.trim().is_empty() {
                return Err(CorpusError::InvalidPair {
                    index,
                    reason: "words must be non-empty".into(),
                });
            }
            if pair.secret.eq_ignore_ascii_case(&pair.spy) {
                return Err(CorpusError::InvalidPair {
                    index,
                    reason: format!(
                        "secret and spy word are both {:?}",
                        pair.secret
                    ),
                });
            }
        }
        Ok(Self { pairs })
    }

    /// The built-in default corpus.
    pub fn builtin() -> Self {
        let pairs = [
            ("Apple", "Banana"),
            ("Beach", "Desert"),
            ("Piano", "Guitar"),
            ("Cat", "Dog"),
            ("Rocket", "Satellite"),
            ("Coffee", "Tea"),
            ("Ocean", "Lake"),
            ("Train", "Bus"),
            ("Winter", "Autumn"),
            ("Doctor", "Nurse"),
        ]
        .into_iter()
        .map(|(secret, spy)| WordPair::new(secret, spy))
        .collect();

        Self::new(pairs).expect("builtin corpus is valid")
    }

    /// Picks one pair uniformly at random.
    pub fn pick(&self, rng: &mut impl Rng) -> &WordPair {
        &self.pairs[rng.random_range(0..self.pairs.len())]
    }

    /// Number of pairs in the corpus.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if the corpus has no pairs. Never true for a
    /// constructed corpus, but keeps clippy and callers honest.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl Default for WordCorpus {
    fn default() -> Self {
        Self::builtin()
    }
}
