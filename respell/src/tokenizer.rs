//! Tokenization of raw text into sentences of words over a letter alphabet.

use std::fs;
use std::path::Path;

use hashbrown::HashSet;

use crate::errors::{RespellError, Result};

const SENTENCE_BREAKS: [char; 3] = ['.', '!', '?'];

/// Splits text into sentences of words.
///
/// A word is a maximal run of alphabet characters. Every other character
/// ends the current word, and `.`, `!`, `?` additionally close the current
/// sentence. The alphabet is loaded from a file and travels with the model
/// through dump and load.
#[derive(Default, Clone, Debug)]
pub struct Tokenizer {
    alphabet: HashSet<char>,
}

impl Tokenizer {
    /// Creates a tokenizer with an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the alphabet with the lowercased non-whitespace characters
    /// of the given file.
    ///
    /// # Errors
    ///
    /// [`RespellError`] is returned when the file cannot be read or contains
    /// no alphabet characters.
    pub fn load_alphabet<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let text = fs::read_to_string(path)?;
        let alphabet: HashSet<char> = lower_case(&text)
            .chars()
            .filter(|ch| !ch.is_whitespace())
            .collect();
        if alphabet.is_empty() {
            return Err(RespellError::invalid_argument(
                "path",
                "contains no alphabet characters",
            ));
        }
        self.alphabet = alphabet;
        Ok(())
    }

    /// Adds characters to the alphabet.
    pub fn extend_alphabet<I>(&mut self, letters: I)
    where
        I: IntoIterator<Item = char>,
    {
        self.alphabet.extend(letters);
    }

    /// Gets the alphabet.
    #[inline(always)]
    pub fn alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    /// Alphabet characters in code-point order, for deterministic output.
    pub(crate) fn sorted_alphabet(&self) -> Vec<char> {
        let mut letters: Vec<char> = self.alphabet.iter().copied().collect();
        letters.sort_unstable();
        letters
    }

    pub(crate) fn set_alphabet(&mut self, letters: Vec<char>) {
        self.alphabet = letters.into_iter().collect();
    }

    /// Splits `text` into sentences of words.
    ///
    /// The input is consumed as is; callers wanting case-insensitive
    /// behavior lowercase it first with [`lower_case`].
    pub fn process(&self, text: &str) -> Vec<Vec<String>> {
        let mut sentences = Vec::new();
        let mut sentence: Vec<String> = Vec::new();
        let mut word = String::new();
        for ch in text.chars() {
            if self.alphabet.contains(&ch) {
                word.push(ch);
                continue;
            }
            if !word.is_empty() {
                sentence.push(std::mem::take(&mut word));
            }
            if SENTENCE_BREAKS.contains(&ch) && !sentence.is_empty() {
                sentences.push(std::mem::take(&mut sentence));
            }
        }
        if !word.is_empty() {
            sentence.push(word);
        }
        if !sentence.is_empty() {
            sentences.push(sentence);
        }
        sentences
    }

    /// Empties the alphabet.
    pub fn clear(&mut self) {
        self.alphabet.clear();
    }
}

/// Lowercases `text` one character at a time, Unicode-aware.
pub fn lower_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}
