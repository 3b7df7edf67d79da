//! The language model: training entry points, scoring, and persistence.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use hashbrown::HashSet;
use log::info;

use crate::common;
use crate::errors::{RespellError, Result};
use crate::store::{self, NgramStore};
use crate::tokenizer::{self, Tokenizer};
use crate::trainer::{self, FreezeStats, GramTables};
use crate::vocabulary::{Vocabulary, WordId, UNKNOWN_WORD_ID};

/// Trigram language model with add-K smoothing over a perfect-hashed count
/// store.
///
/// A model passes through three phases: empty, under construction (one of
/// [`train`](Self::train), [`train_with_base`](Self::train_with_base),
/// [`merge`](Self::merge)), and frozen. The training entry points build a
/// complete frozen model and replace `self` only on success, so a failed
/// call leaves the previous state intact. After freezing, only queries and
/// persistence are meaningful; there is no way to add counts to a frozen
/// model other than retraining on top of its dump.
pub struct LanguageModel {
    k: f64,
    vocab: Vocabulary,
    tokenizer: Tokenizer,
    total_words: u64,
    vocab_size: u64,
    checksum: u64,
    grams: Option<NgramStore>,
}

impl Default for LanguageModel {
    fn default() -> Self {
        Self {
            k: common::DEFAULT_K,
            vocab: Vocabulary::default(),
            tokenizer: Tokenizer::default(),
            total_words: 0,
            vocab_size: 0,
            checksum: 0,
            grams: None,
        }
    }
}

impl LanguageModel {
    /// Creates an empty model with the default smoothing constant.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the add-K smoothing constant.
    #[inline(always)]
    pub const fn k(&self) -> f64 {
        self.k
    }

    /// Trains the model from a tokenized text corpus.
    ///
    /// The text is lowercased, split into sentences of words over the given
    /// alphabet, and counted into unigram/bigram/trigram tables, which then
    /// freeze into the store. Any previous state of `self` is replaced.
    ///
    /// # Errors
    ///
    /// [`RespellError`] is returned when a file cannot be read or the
    /// tokenizer produces no sentences; `self` is left unchanged.
    pub fn train<P, Q>(&mut self, text_file: P, alphabet_file: Q) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        self.train_at(
            text_file.as_ref(),
            alphabet_file.as_ref(),
            None,
            current_time_ms(),
        )
    }

    /// Trains from a text corpus on top of a previously dumped model.
    ///
    /// The base vocabulary is imported first, so base ids survive, and every
    /// gram count of the result is the sum of the base count and the new
    /// corpus count.
    ///
    /// # Errors
    ///
    /// See [`train`](Self::train); additionally fails when the base model
    /// cannot be loaded.
    pub fn train_with_base<P, Q, R>(
        &mut self,
        text_file: P,
        alphabet_file: Q,
        base_model_file: R,
    ) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        R: AsRef<Path>,
    {
        self.train_at(
            text_file.as_ref(),
            alphabet_file.as_ref(),
            Some(base_model_file.as_ref()),
            current_time_ms(),
        )
    }

    pub(crate) fn train_at(
        &mut self,
        text_file: &Path,
        alphabet_file: &Path,
        base_model_file: Option<&Path>,
        start_time_ms: u64,
    ) -> Result<()> {
        let mut model = Self::new();

        let base = match base_model_file {
            Some(path) => {
                info!("loading base model");
                let mut base = Self::new();
                base.load(path)?;
                for word in base.vocab.words() {
                    model.vocab.intern(word);
                }
                Some(base)
            }
            None => None,
        };

        model.tokenizer.load_alphabet(alphabet_file)?;

        info!("loading text");
        let text = tokenizer::lower_case(&fs::read_to_string(text_file)?);
        let sentences = model.tokenizer.process(&text);
        if sentences.is_empty() {
            return Err(RespellError::invalid_argument(
                "text_file",
                "tokenizer produced no sentences",
            ));
        }
        let text_size = text.chars().count() as u64;
        let sentence_count = sentences.len() as u64;

        let id_sentences: Vec<Vec<WordId>> = sentences
            .iter()
            .map(|words| words.iter().map(|word| model.vocab.intern(word)).collect())
            .collect();
        // The tables below are the peak of memory use; release the raw text
        // and the surface sentences before building them.
        drop(text);
        drop(sentences);

        info!("generating n-grams from {} sentences", id_sentences.len());
        let mut tables = GramTables::default();
        let mut total_words = 0;
        trainer::accumulate(&mut tables, &id_sentences, base.as_ref(), &mut total_words);
        drop(id_sentences);
        if let Some(base) = &base {
            trainer::copy_untouched(&mut tables, base, &mut total_words);
        }

        model.total_words = total_words;
        model.vocab_size = tables.grams1.len() as u64;
        let stats = FreezeStats {
            start_time_ms,
            text_size: Some(text_size),
            sentence_count: Some(sentence_count),
        };
        let (grams, checksum) = trainer::freeze(&tables, &stats)?;
        model.grams = grams;
        model.checksum = checksum;

        *self = model;
        Ok(())
    }

    /// Merges two previously dumped models into `self`.
    ///
    /// The base model's vocabulary is imported first; complementary words
    /// reuse existing ids where the surface matches and get fresh ids
    /// otherwise. Gram counts add up, saturating at the codec cap.
    ///
    /// # Errors
    ///
    /// [`RespellError`] is returned when either model cannot be loaded;
    /// `self` is left unchanged.
    pub fn merge<P, Q>(&mut self, base_model_file: P, complementary_model_file: Q) -> Result<()>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        self.merge_at(
            base_model_file.as_ref(),
            complementary_model_file.as_ref(),
            current_time_ms(),
        )
    }

    pub(crate) fn merge_at(
        &mut self,
        base_model_file: &Path,
        complementary_model_file: &Path,
        start_time_ms: u64,
    ) -> Result<()> {
        let mut model = Self::new();

        info!("loading base model");
        let mut base = Self::new();
        base.load(base_model_file)?;
        info!("loading complementary model");
        let mut complementary = Self::new();
        complementary.load(complementary_model_file)?;

        model
            .tokenizer
            .extend_alphabet(base.tokenizer.alphabet().iter().copied());
        model
            .tokenizer
            .extend_alphabet(complementary.tokenizer.alphabet().iter().copied());

        let mut tables = GramTables::default();
        let mut total_words = 0;

        let base_ids: Vec<WordId> = base
            .vocab
            .words()
            .iter()
            .map(|word| model.vocab.intern(word))
            .collect();
        trainer::absorb(&mut tables, &base, &base_ids, &mut total_words);

        let complementary_ids: Vec<WordId> = complementary
            .vocab
            .words()
            .iter()
            .map(|word| model.vocab.intern(word))
            .collect();
        trainer::absorb(&mut tables, &complementary, &complementary_ids, &mut total_words);

        model.total_words = total_words;
        model.vocab_size = tables.grams1.len() as u64;
        let stats = FreezeStats {
            start_time_ms,
            text_size: None,
            sentence_count: None,
        };
        let (grams, checksum) = trainer::freeze(&tables, &stats)?;
        model.grams = grams;
        model.checksum = checksum;

        *self = model;
        Ok(())
    }

    /// Scores raw text: lowercases it, tokenizes it, and scores the words of
    /// all sentences as one sequence.
    pub fn score(&self, text: &str) -> f64 {
        let lowered = tokenizer::lower_case(text);
        let words: Vec<String> = self
            .tokenizer
            .process(&lowered)
            .into_iter()
            .flatten()
            .collect();
        self.score_words(&words)
    }

    /// Scores a sequence of already tokenized words.
    ///
    /// Returns the sum over every trigram window of the smoothed unigram,
    /// bigram, and trigram log-probabilities. Two out-of-vocabulary
    /// sentinels are appended so the window reaches the true end; their
    /// windows contribute only smoothing terms, which makes the score mildly
    /// length-dependent. An empty sequence scores the smallest positive
    /// representable number.
    pub fn score_words<S: AsRef<str>>(&self, words: &[S]) -> f64 {
        let mut ids: Vec<WordId> = words
            .iter()
            .map(|word| self.vocab.word_id(word.as_ref()))
            .collect();
        if ids.is_empty() {
            return f64::MIN_POSITIVE;
        }
        ids.push(UNKNOWN_WORD_ID);
        ids.push(UNKNOWN_WORD_ID);

        let mut result = 0.0;
        for window in ids.windows(3) {
            result += self.gram1_prob(window[0]).ln();
            result += self.gram2_prob(window[0], window[1]).ln();
            result += self.gram3_prob(window[0], window[1], window[2]).ln();
        }
        result
    }

    fn gram1_prob(&self, a: WordId) -> f64 {
        let count = f64::from(self.unigram_count(a)) + self.k;
        count / (self.total_words as f64 + self.vocab_size as f64)
    }

    fn gram2_prob(&self, a: WordId, b: WordId) -> f64 {
        let count1 = self.unigram_count(a);
        let mut count2 = self.bigram_count(a, b);
        if count2 > count1 {
            // A bigram can never outnumber its first word: fingerprint
            // collision in the store.
            count2 = 0;
        }
        (f64::from(count2) + self.k) / (f64::from(count1) + self.total_words as f64)
    }

    fn gram3_prob(&self, a: WordId, b: WordId, c: WordId) -> f64 {
        let count2 = self.bigram_count(a, b);
        let mut count3 = self.trigram_count(a, b, c);
        if count3 > count2 {
            count3 = 0;
        }
        (f64::from(count3) + self.k) / (f64::from(count2) + self.total_words as f64)
    }

    /// Stored count of the unigram `a`, zero for the unknown id.
    pub fn unigram_count(&self, a: WordId) -> u32 {
        if a == UNKNOWN_WORD_ID {
            return 0;
        }
        self.store_count(store::gram1_key(a))
    }

    /// Stored count of the bigram `(a, b)`, zero when either id is unknown.
    pub fn bigram_count(&self, a: WordId, b: WordId) -> u32 {
        if a == UNKNOWN_WORD_ID || b == UNKNOWN_WORD_ID {
            return 0;
        }
        self.store_count(store::gram2_key(a, b))
    }

    /// Stored count of the trigram `(a, b, c)`, zero when any id is unknown.
    pub fn trigram_count(&self, a: WordId, b: WordId, c: WordId) -> u32 {
        if a == UNKNOWN_WORD_ID || b == UNKNOWN_WORD_ID || c == UNKNOWN_WORD_ID {
            return 0;
        }
        self.store_count(store::gram3_key(a, b, c))
    }

    fn store_count(&self, key: Vec<u8>) -> u32 {
        self.grams.as_ref().map_or(0, |grams| grams.count(key))
    }

    /// Stored count of the word with the given id.
    pub fn word_count(&self, id: WordId) -> u32 {
        self.unigram_count(id)
    }

    /// Checks if `word` is in the vocabulary.
    pub fn contains_word(&self, word: &str) -> bool {
        self.vocab.contains(word)
    }

    /// Id of `word`, or [`UNKNOWN_WORD_ID`] for out-of-vocabulary words.
    pub fn word_id(&self, word: &str) -> WordId {
        self.vocab.word_id(word)
    }

    /// Word with the given id.
    pub fn word_by_id(&self, id: WordId) -> Option<&str> {
        self.vocab.word_by_id(id)
    }

    /// Gets the vocabulary.
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Content checksum computed at freeze time.
    pub fn checksum(&self) -> u64 {
        self.checksum
    }

    /// Sum of all unigram counts at freeze time.
    pub fn total_words(&self) -> u64 {
        self.total_words
    }

    /// Number of distinct unigrams at freeze time.
    pub fn vocab_size(&self) -> u64 {
        self.vocab_size
    }

    /// Gets the tokenizer alphabet.
    pub fn alphabet(&self) -> &HashSet<char> {
        self.tokenizer.alphabet()
    }

    /// Splits `text` into sentences of words with the model's tokenizer.
    pub fn tokenize(&self, text: &str) -> Vec<Vec<String>> {
        self.tokenizer.process(text)
    }

    /// Writes the model to a file: magic, version, the model body, and the
    /// magic again as a trailer.
    ///
    /// # Errors
    ///
    /// [`RespellError`] is returned when the file cannot be created or
    /// encoding fails.
    pub fn dump<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut wtr = BufWriter::new(File::create(path)?);
        self.write(&mut wtr)?;
        Ok(())
    }

    /// Exports the model data to a writer; see [`dump`](Self::dump).
    ///
    /// # Errors
    ///
    /// When bincode generates an error, it will be returned as is.
    pub fn write<W: Write>(&self, wtr: &mut W) -> Result<usize> {
        let config = common::bincode_config();
        let mut num_bytes = bincode::encode_into_std_write(common::MODEL_MAGIC, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(common::MODEL_VERSION, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(self.k, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(self.vocab.words(), wtr, config)?;
        num_bytes += bincode::encode_into_std_write(self.total_words, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(self.vocab_size, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(self.checksum, wtr, config)?;
        num_bytes +=
            bincode::encode_into_std_write(self.tokenizer.sorted_alphabet(), wtr, config)?;
        num_bytes += bincode::encode_into_std_write(&self.grams, wtr, config)?;
        num_bytes += bincode::encode_into_std_write(common::MODEL_MAGIC, wtr, config)?;
        wtr.flush()?;
        Ok(num_bytes)
    }

    /// Replaces the model with the contents of a dumped file.
    ///
    /// The word-to-id index and the alphabet set are rebuilt from the dumped
    /// vectors.
    ///
    /// # Errors
    ///
    /// A missing file, a bad leading magic, or a version mismatch leave the
    /// model unchanged. A decode failure past the version field or a bad
    /// trailing magic means the file is corrupt; the model is cleared before
    /// the error is returned.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut rdr = BufReader::new(File::open(path)?);
        self.read_replace(&mut rdr)
    }

    fn read_replace<R: Read>(&mut self, rdr: &mut R) -> Result<()> {
        let config = common::bincode_config();
        let magic: u64 = bincode::decode_from_std_read(rdr, config)?;
        if magic != common::MODEL_MAGIC {
            return Err(RespellError::model_format("bad leading magic number"));
        }
        let version: u16 = bincode::decode_from_std_read(rdr, config)?;
        if version != common::MODEL_VERSION {
            return Err(RespellError::model_format(format!(
                "unsupported model version: {version}"
            )));
        }
        match Self::decode_body(rdr) {
            Ok(model) => {
                *self = model;
                Ok(())
            }
            Err(e) => {
                self.clear();
                Err(e)
            }
        }
    }

    fn decode_body<R: Read>(rdr: &mut R) -> Result<Self> {
        let config = common::bincode_config();
        let k: f64 = bincode::decode_from_std_read(rdr, config)?;
        let words: Vec<String> = bincode::decode_from_std_read(rdr, config)?;
        let total_words: u64 = bincode::decode_from_std_read(rdr, config)?;
        let vocab_size: u64 = bincode::decode_from_std_read(rdr, config)?;
        let checksum: u64 = bincode::decode_from_std_read(rdr, config)?;
        let alphabet: Vec<char> = bincode::decode_from_std_read(rdr, config)?;
        let grams: Option<NgramStore> = bincode::decode_from_std_read(rdr, config)?;
        let trailing: u64 = bincode::decode_from_std_read(rdr, config)?;
        if trailing != common::MODEL_MAGIC {
            return Err(RespellError::model_format("bad trailing magic number"));
        }

        let mut tokenizer = Tokenizer::new();
        tokenizer.set_alphabet(alphabet);
        Ok(Self {
            k,
            vocab: Vocabulary::from_words(words),
            tokenizer,
            total_words,
            vocab_size,
            checksum,
            grams,
        })
    }

    /// Returns the model to its empty state, with the default smoothing
    /// constant. Idempotent.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[cfg(test)]
    pub(crate) fn grams(&self) -> Option<&NgramStore> {
        self.grams.as_ref()
    }
}

fn current_time_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis() as u64)
}
