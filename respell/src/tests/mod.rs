use std::fs;
use std::path::PathBuf;

use crate::model::LanguageModel;

mod model;

pub(crate) const ALPHABET: &str = "abcdefghijklmnopqrstuvwxyz";

/// Writes a uniquely named temporary file and returns its path.
pub(crate) fn tmp_file(name: &str, contents: &str) -> PathBuf {
    let path = tmp_path(name);
    fs::write(&path, contents).unwrap();
    path
}

pub(crate) fn tmp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("respell-{}-{}", std::process::id(), name));
    path
}

/// Trains a fresh model on `text` over the ASCII alphabet.
pub(crate) fn train_on(text: &str, tag: &str) -> LanguageModel {
    let text_file = tmp_file(&format!("{tag}-text.txt"), text);
    let alphabet_file = tmp_file(&format!("{tag}-alphabet.txt"), ALPHABET);
    let mut model = LanguageModel::new();
    model.train(&text_file, &alphabet_file).unwrap();
    fs::remove_file(&text_file).unwrap();
    fs::remove_file(&alphabet_file).unwrap();
    model
}
