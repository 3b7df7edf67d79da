//! Bidirectional mapping between surface words and dense integer ids.

use hashbrown::HashMap;

/// Dense id of a word, assigned from 0 in first-seen order.
pub type WordId = u32;

/// Sentinel id denoting a word outside the vocabulary.
///
/// It never collides with an assigned id and short-circuits every store
/// lookup to a zero count.
pub const UNKNOWN_WORD_ID: WordId = WordId::MAX;

/// Vocabulary of a model.
///
/// Ids are allocated monotonically and are stable for the model's lifetime;
/// the id-to-word vector is the primary owned form and the word-to-id index
/// is derived from it.
#[derive(Default, Clone, Debug)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, WordId>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id of `word`, assigning the next free id on first sight.
    ///
    /// `word` must be 1..10,000 code points long; anything else is a caller
    /// bug.
    pub fn intern(&mut self, word: &str) -> WordId {
        debug_assert!(!word.is_empty() && word.chars().count() < 10_000);
        if let Some(&id) = self.index.get(word) {
            return id;
        }
        let id = u32::try_from(self.words.len()).unwrap();
        self.words.push(word.to_string());
        self.index.insert(word.to_string(), id);
        id
    }

    /// Returns the id of `word`, or [`UNKNOWN_WORD_ID`] if it was never
    /// interned.
    #[inline(always)]
    pub fn word_id(&self, word: &str) -> WordId {
        self.index.get(word).copied().unwrap_or(UNKNOWN_WORD_ID)
    }

    /// Returns the word with the given id.
    #[inline(always)]
    pub fn word_by_id(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Checks if `word` has an id.
    #[inline(always)]
    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    /// Number of words.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Checks if the vocabulary is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in id order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Rebuilds the word-to-id index over a dumped id-to-word vector.
    pub(crate) fn from_words(words: Vec<String>) -> Self {
        let index = words
            .iter()
            .enumerate()
            .map(|(id, word)| (word.clone(), u32::try_from(id).unwrap()))
            .collect();
        Self { words, index }
    }
}
