use std::fs;

use crate::model::LanguageModel;
use crate::tests::{tmp_file, tmp_path, train_on, ALPHABET};
use crate::vocabulary::UNKNOWN_WORD_ID;

#[test]
fn test_train_counts() {
    let model = train_on("the cat sat on the mat", "counts");

    assert_eq!(model.total_words(), 6);
    assert_eq!(model.vocab_size(), 5);
    assert_eq!(model.vocabulary().len(), 5);

    let the = model.word_id("the");
    let cat = model.word_id("cat");
    let sat = model.word_id("sat");
    let on = model.word_id("on");
    let mat = model.word_id("mat");

    assert_eq!(model.unigram_count(the), 2);
    assert_eq!(model.unigram_count(cat), 1);
    assert_eq!(model.word_count(mat), 1);

    assert_eq!(model.bigram_count(the, cat), 1);
    assert_eq!(model.bigram_count(the, mat), 1);
    assert_eq!(model.bigram_count(cat, the), 0);
    assert_eq!(model.bigram_count(mat, the), 0);

    assert_eq!(model.trigram_count(the, cat, sat), 1);
    assert_eq!(model.trigram_count(on, the, mat), 1);
    assert_eq!(model.trigram_count(mat, cat, sat), 0);

    // Before any packing loss could matter the counts are tiny, so the
    // unigram totals must add up exactly.
    let sum: u64 = (0..5).map(|id| u64::from(model.unigram_count(id))).sum();
    assert_eq!(sum, model.total_words());
}

#[test]
fn test_interned_words_round_trip() {
    let model = train_on("the cat sat on the mat", "roundtrip-words");
    for word in ["the", "cat", "sat", "on", "mat"] {
        assert!(model.contains_word(word));
        assert_eq!(model.word_by_id(model.word_id(word)), Some(word));
    }
}

#[test]
fn test_score() {
    let model = train_on("the cat sat on the mat", "score");

    let score = model.score("the cat sat");
    assert!(score.is_finite());
    assert!(score < 0.0);

    // A sentence made of trained words outranks the same-length nonsense.
    assert!(model.score("the cat sat") > model.score("zzz zzz zzz"));

    assert_eq!(model.score(""), f64::MIN_POSITIVE);
    let none: [&str; 0] = [];
    assert_eq!(model.score_words(&none), f64::MIN_POSITIVE);
}

#[test]
fn test_unknown_words() {
    let model = train_on("the cat sat on the mat", "oov");

    assert_eq!(model.word_id("zzz"), UNKNOWN_WORD_ID);
    assert!(!model.contains_word("zzz"));
    assert_eq!(model.unigram_count(UNKNOWN_WORD_ID), 0);
    assert_eq!(model.bigram_count(UNKNOWN_WORD_ID, 0), 0);
    assert_eq!(model.trigram_count(0, UNKNOWN_WORD_ID, 1), 0);

    // Only smoothing terms contribute, so the score stays finite.
    let score = model.score_words(&["zzz"]);
    assert!(score.is_finite());
    assert!(score < 0.0);
}

#[test]
fn test_training_is_deterministic() {
    let text_file = tmp_file("det-text.txt", "the cat sat on the mat");
    let alphabet_file = tmp_file("det-alphabet.txt", ALPHABET);

    let mut first = LanguageModel::new();
    first
        .train_at(&text_file, &alphabet_file, None, 1_234_567)
        .unwrap();
    let mut second = LanguageModel::new();
    second
        .train_at(&text_file, &alphabet_file, None, 1_234_567)
        .unwrap();

    assert_eq!(first.checksum(), second.checksum());
    assert_eq!(
        first.grams().unwrap().buckets(),
        second.grams().unwrap().buckets()
    );

    fs::remove_file(&text_file).unwrap();
    fs::remove_file(&alphabet_file).unwrap();
}

#[test]
fn test_dump_load_round_trip() {
    let model = train_on("the cat sat on the mat", "dump");
    let path = tmp_path("dump-model.bin");
    model.dump(&path).unwrap();

    let mut loaded = LanguageModel::new();
    loaded.load(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(loaded.checksum(), model.checksum());
    assert_eq!(loaded.total_words(), model.total_words());
    assert_eq!(loaded.vocab_size(), model.vocab_size());
    assert_eq!(loaded.word_id("the"), model.word_id("the"));
    assert_eq!(loaded.vocabulary().words(), model.vocabulary().words());
    assert_eq!(
        loaded.alphabet().len(),
        model.alphabet().len()
    );
    assert_eq!(loaded.score("the cat"), model.score("the cat"));
    assert_eq!(loaded.score("the cat sat"), model.score("the cat sat"));
}

#[test]
fn test_load_leaves_model_intact_on_bad_magic() {
    let mut model = train_on("the cat sat on the mat", "bad-magic");
    let checksum = model.checksum();

    let garbage = tmp_file("bad-magic.bin", "this is not a model file at all");
    assert!(model.load(&garbage).is_err());
    fs::remove_file(&garbage).unwrap();

    assert_eq!(model.checksum(), checksum);
    assert_eq!(model.word_id("the"), 0);
}

#[test]
fn test_load_clears_model_on_truncated_file() {
    let model = train_on("the cat sat on the mat", "truncated");
    let path = tmp_path("truncated-model.bin");
    model.dump(&path).unwrap();

    let mut bytes = fs::read(&path).unwrap();
    bytes.truncate(bytes.len() - 1);
    fs::write(&path, &bytes).unwrap();

    let mut victim = train_on("a b c", "truncated-victim");
    assert!(victim.load(&path).is_err());
    fs::remove_file(&path).unwrap();

    assert_eq!(victim.vocab_size(), 0);
    assert_eq!(victim.total_words(), 0);
    assert!(!victim.contains_word("a"));
}

#[test]
fn test_clear_is_idempotent() {
    let mut model = train_on("the cat sat on the mat", "clear");
    model.clear();
    assert_eq!(model.checksum(), 0);
    assert_eq!(model.total_words(), 0);
    assert_eq!(model.vocab_size(), 0);
    assert!(model.vocabulary().is_empty());
    assert!(model.alphabet().is_empty());

    model.clear();
    assert_eq!(model.checksum(), 0);
    assert!(model.vocabulary().is_empty());
}

#[test]
fn test_merge() {
    let a = train_on("a b c", "merge-a");
    let b = train_on("b c d", "merge-b");
    let a_path = tmp_path("merge-a.bin");
    let b_path = tmp_path("merge-b.bin");
    a.dump(&a_path).unwrap();
    b.dump(&b_path).unwrap();

    let mut merged = LanguageModel::new();
    merged.merge(&a_path, &b_path).unwrap();
    fs::remove_file(&a_path).unwrap();
    fs::remove_file(&b_path).unwrap();

    for word in ["a", "b", "c", "d"] {
        assert!(merged.contains_word(word));
    }
    assert_eq!(merged.vocab_size(), 4);
    assert_eq!(merged.total_words(), 6);

    assert_eq!(merged.unigram_count(merged.word_id("a")), 1);
    assert_eq!(merged.unigram_count(merged.word_id("b")), 2);
    assert_eq!(merged.unigram_count(merged.word_id("c")), 2);
    assert_eq!(merged.unigram_count(merged.word_id("d")), 1);

    let (a_id, b_id) = (merged.word_id("a"), merged.word_id("b"));
    let (c_id, d_id) = (merged.word_id("c"), merged.word_id("d"));
    assert_eq!(merged.bigram_count(a_id, b_id), 1);
    assert_eq!(merged.bigram_count(b_id, c_id), 2);
    assert_eq!(merged.bigram_count(c_id, d_id), 1);
    assert_eq!(merged.trigram_count(a_id, b_id, c_id), 1);
    assert_eq!(merged.trigram_count(b_id, c_id, d_id), 1);
}

#[test]
fn test_merge_with_empty_model_copies_the_base() {
    let a = train_on("a b c", "merge-empty-a");
    let empty = LanguageModel::new();
    let a_path = tmp_path("merge-empty-a.bin");
    let empty_path = tmp_path("merge-empty-b.bin");
    a.dump(&a_path).unwrap();
    empty.dump(&empty_path).unwrap();

    let mut merged = LanguageModel::new();
    merged.merge(&a_path, &empty_path).unwrap();
    fs::remove_file(&a_path).unwrap();
    fs::remove_file(&empty_path).unwrap();

    assert_eq!(merged.vocab_size(), a.vocab_size());
    assert_eq!(merged.total_words(), a.total_words());
    for word in ["a", "b", "c"] {
        let id = merged.word_id(word);
        assert_eq!(merged.unigram_count(id), a.unigram_count(a.word_id(word)));
    }
    let (a_id, b_id, c_id) = (
        merged.word_id("a"),
        merged.word_id("b"),
        merged.word_id("c"),
    );
    assert_eq!(merged.bigram_count(a_id, b_id), 1);
    assert_eq!(merged.trigram_count(a_id, b_id, c_id), 1);
}

#[test]
fn test_train_with_base_sums_both_corpora() {
    let base = train_on("a b c", "base");
    let base_path = tmp_path("base-model.bin");
    base.dump(&base_path).unwrap();

    let text_file = tmp_file("base-new-text.txt", "b c d");
    let alphabet_file = tmp_file("base-new-alphabet.txt", ALPHABET);
    let mut model = LanguageModel::new();
    model
        .train_with_base(&text_file, &alphabet_file, &base_path)
        .unwrap();
    fs::remove_file(&base_path).unwrap();
    fs::remove_file(&text_file).unwrap();
    fs::remove_file(&alphabet_file).unwrap();

    // Base ids survive; the new word gets the next id.
    assert_eq!(model.word_id("a"), base.word_id("a"));
    assert_eq!(model.word_id("b"), base.word_id("b"));
    assert_eq!(model.word_id("c"), base.word_id("c"));
    assert_eq!(model.word_id("d"), 3);

    assert_eq!(model.vocab_size(), 4);
    assert_eq!(model.total_words(), 6);
    assert_eq!(model.unigram_count(model.word_id("a")), 1);
    assert_eq!(model.unigram_count(model.word_id("b")), 2);
    assert_eq!(model.unigram_count(model.word_id("c")), 2);
    assert_eq!(model.unigram_count(model.word_id("d")), 1);

    let (a_id, b_id) = (model.word_id("a"), model.word_id("b"));
    let (c_id, d_id) = (model.word_id("c"), model.word_id("d"));
    assert_eq!(model.bigram_count(a_id, b_id), 1);
    assert_eq!(model.bigram_count(b_id, c_id), 2);
    assert_eq!(model.bigram_count(c_id, d_id), 1);
    assert_eq!(model.trigram_count(a_id, b_id, c_id), 1);
    assert_eq!(model.trigram_count(b_id, c_id, d_id), 1);
}

#[test]
fn test_training_on_empty_text_fails_and_leaves_model_alone() {
    let mut model = train_on("the cat sat on the mat", "empty-text");
    let checksum = model.checksum();

    let text_file = tmp_file("empty-text.txt", "... 42 !!!");
    let alphabet_file = tmp_file("empty-alphabet.txt", ALPHABET);
    assert!(model.train(&text_file, &alphabet_file).is_err());
    fs::remove_file(&text_file).unwrap();
    fs::remove_file(&alphabet_file).unwrap();

    assert_eq!(model.checksum(), checksum);
    assert_eq!(model.total_words(), 6);
}

#[test]
fn test_tokenize_uses_the_trained_alphabet() {
    let model = train_on("the cat sat on the mat", "tokenize");
    let sentences = model.tokenize("the mat. the cat");
    assert_eq!(sentences.len(), 2);
    assert_eq!(sentences[0], vec!["the".to_string(), "mat".to_string()]);
}
