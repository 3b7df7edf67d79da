//! Accumulation of n-gram frequency tables and their freeze into the store.

use std::time::{Duration, Instant};

use hashbrown::HashMap;
use log::info;

use crate::codec::MAX_COUNT;
use crate::common;
use crate::errors::Result;
use crate::model::LanguageModel;
use crate::store::{self, NgramStore};
use crate::vocabulary::WordId;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(4);

/// Mutable unigram/bigram/trigram frequency tables.
///
/// This is the peak-memory phase of training; the raw text and sentence
/// buffers must already be gone by the time the tables freeze.
#[derive(Default)]
pub(crate) struct GramTables {
    pub(crate) grams1: HashMap<WordId, u32>,
    pub(crate) grams2: HashMap<(WordId, WordId), u32>,
    pub(crate) grams3: HashMap<(WordId, WordId, WordId), u32>,
}

impl GramTables {
    fn add1(&mut self, key: WordId, n: u32) {
        let slot = self.grams1.entry(key).or_insert(0);
        *slot = add_capped(*slot, n);
    }

    fn add2(&mut self, key: (WordId, WordId), n: u32) {
        let slot = self.grams2.entry(key).or_insert(0);
        *slot = add_capped(*slot, n);
    }

    fn add3(&mut self, key: (WordId, WordId, WordId), n: u32) {
        let slot = self.grams3.entry(key).or_insert(0);
        *slot = add_capped(*slot, n);
    }
}

/// Adds counts, saturating at [`MAX_COUNT`] so merged corpora never leave
/// the codec domain.
fn add_capped(current: u32, n: u32) -> u32 {
    current.saturating_add(n).min(MAX_COUNT)
}

/// Counts every unigram, bigram, and trigram of `sentences` into `tables`.
///
/// With `base` present, a gram key is seeded with the base model's count the
/// first time the new text touches it, so the final count is the sum of both
/// corpora; base unigram seeds also enter `total_words`.
pub(crate) fn accumulate(
    tables: &mut GramTables,
    sentences: &[Vec<WordId>],
    base: Option<&LanguageModel>,
    total_words: &mut u64,
) {
    let total = sentences.len();
    let mut last_report = Instant::now();
    for (i, words) in sentences.iter().enumerate() {
        for j in 0..words.len() {
            let w = words[j];
            if let Some(base) = base {
                if !tables.grams1.contains_key(&w) {
                    let count = base.unigram_count(w);
                    tables.grams1.insert(w, count);
                    *total_words += u64::from(count);
                }
            }
            tables.add1(w, 1);
            *total_words += 1;

            if j + 1 < words.len() {
                let key2 = (words[j], words[j + 1]);
                if let Some(base) = base {
                    if !tables.grams2.contains_key(&key2) {
                        tables.grams2.insert(key2, base.bigram_count(key2.0, key2.1));
                    }
                }
                tables.add2(key2, 1);

                if j + 2 < words.len() {
                    let key3 = (words[j], words[j + 1], words[j + 2]);
                    if let Some(base) = base {
                        if !tables.grams3.contains_key(&key3) {
                            tables
                                .grams3
                                .insert(key3, base.trigram_count(key3.0, key3.1, key3.2));
                        }
                    }
                    tables.add3(key3, 1);
                }
            }
        }
        if last_report.elapsed() >= PROGRESS_INTERVAL {
            info!("processed {:.1}%", 100.0 * i as f64 / total as f64);
            last_report = Instant::now();
        }
    }
}

/// Copies every gram of `base` that the new text did not touch.
///
/// The store cannot enumerate its keys, so this is a guarded scan over the
/// base id cube: a zero base bigram count prunes the trigram scan beneath
/// it, which is sound because a positive trigram count implies a positive
/// count for its bigram prefix.
pub(crate) fn copy_untouched(
    tables: &mut GramTables,
    base: &LanguageModel,
    total_words: &mut u64,
) {
    let n = u32::try_from(base.vocabulary().len()).unwrap();
    for i in 0..n {
        if !tables.grams1.contains_key(&i) {
            let count = base.unigram_count(i);
            tables.grams1.insert(i, count);
            *total_words += u64::from(count);
        }
        for j in 0..n {
            let count2 = base.bigram_count(i, j);
            if count2 == 0 {
                continue;
            }
            tables.grams2.entry((i, j)).or_insert(count2);
            for k in 0..n {
                let count3 = base.trigram_count(i, j, k);
                if count3 > 0 {
                    tables.grams3.entry((i, j, k)).or_insert(count3);
                }
            }
        }
    }
}

/// Adds every gram of `model` into `tables`, translating its ids into the
/// merged space through `id_map`.
pub(crate) fn absorb(
    tables: &mut GramTables,
    model: &LanguageModel,
    id_map: &[WordId],
    total_words: &mut u64,
) {
    let n = u32::try_from(id_map.len()).unwrap();
    for i in 0..n {
        let ti = id_map[i as usize];
        let count = model.unigram_count(i);
        tables.add1(ti, count);
        *total_words += u64::from(count);
        for j in 0..n {
            let count2 = model.bigram_count(i, j);
            if count2 == 0 {
                continue;
            }
            let tj = id_map[j as usize];
            tables.add2((ti, tj), count2);
            for k in 0..n {
                let count3 = model.trigram_count(i, j, k);
                if count3 > 0 {
                    tables.add3((ti, tj, id_map[k as usize]), count3);
                }
            }
        }
    }
}

/// Inputs of the content checksum; the text fields are present on training
/// paths only.
pub(crate) struct FreezeStats {
    pub(crate) start_time_ms: u64,
    pub(crate) text_size: Option<u64>,
    pub(crate) sentence_count: Option<u64>,
}

/// Serializes the gram keys, builds the perfect hash, fills the buckets, and
/// computes the content checksum.
///
/// An empty key set yields no store; every lookup then returns zero.
pub(crate) fn freeze(
    tables: &GramTables,
    stats: &FreezeStats,
) -> Result<(Option<NgramStore>, u64)> {
    let n1 = tables.grams1.len();
    let n2 = tables.grams2.len();
    let n3 = tables.grams3.len();
    info!("ngrams1: {n1}");
    info!("ngrams2: {n2}");
    info!("ngrams3: {n3}");
    info!("total: {}", n1 + n2 + n3);

    let mut keys = Vec::with_capacity(n1 + n2 + n3);
    for &key in tables.grams1.keys() {
        keys.push(store::gram1_key(key));
    }
    for &(a, b) in tables.grams2.keys() {
        keys.push(store::gram2_key(a, b));
    }
    for &(a, b, c) in tables.grams3.keys() {
        keys.push(store::gram3_key(a, b, c));
    }

    let grams = if keys.is_empty() {
        None
    } else {
        info!("generating perfect hash");
        let mut grams = NgramStore::new(&keys);
        drop(keys);
        for (&key, &count) in &tables.grams1 {
            grams.set(store::gram1_key(key), count);
        }
        for (&(a, b), &count) in &tables.grams2 {
            grams.set(store::gram2_key(a, b), count);
        }
        for (&(a, b, c), &count) in &tables.grams3 {
            grams.set(store::gram3_key(a, b, c), count);
        }
        info!("buckets filled: {}", grams.bucket_count());
        Some(grams)
    };

    let bucket_count = grams.as_ref().map_or(0, NgramStore::bucket_count);
    let config = common::bincode_config();
    let summary = (
        stats.start_time_ms,
        n1 as u64,
        n2 as u64,
        n3 as u64,
        bucket_count as u64,
    );
    let encoded = match (stats.text_size, stats.sentence_count) {
        (Some(text_size), Some(sentence_count)) => {
            bincode::encode_to_vec((summary, text_size, sentence_count), config)?
        }
        _ => bincode::encode_to_vec(summary, config)?,
    };
    Ok((grams, cityhasher::hash::<u64>(&encoded)))
}
