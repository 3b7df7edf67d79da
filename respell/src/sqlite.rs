//! Diagnostic export of raw model counts into a SQLite database.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::errors::Result;
use crate::model::LanguageModel;

impl LanguageModel {
    /// Exports the vocabulary, alphabet, and raw n-gram counts to a SQLite
    /// file, dropping and recreating the tables first.
    ///
    /// Missing id positions in the `counts` table are NULL, which is how a
    /// row encodes whether it is a unigram, bigram, or trigram. The store
    /// cannot enumerate its keys, so bigram and trigram rows come from a
    /// guarded scan over the id cube. This is a diagnostic side channel; the
    /// engine never reads the database back.
    ///
    /// # Errors
    ///
    /// [`RespellError`](crate::errors::RespellError) is returned when the
    /// database cannot be opened or a statement fails; already-written rows
    /// of a failed export may remain.
    pub fn export_sqlite<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut conn = Connection::open(path)?;
        conn.execute_batch(
            "drop table if exists words;
             drop table if exists counts;
             drop table if exists alphabet;
             create table words(id integer PRIMARY KEY, word text);
             create table counts(id_1 integer NOT NULL, id_2 integer, id_3 integer, count integer);
             create table alphabet(id integer PRIMARY KEY, letter text);",
        )?;

        let tx = conn.transaction()?;
        let mut letters: Vec<char> = self.alphabet().iter().copied().collect();
        letters.sort_unstable();
        for (id, letter) in letters.into_iter().enumerate() {
            tx.execute(
                "insert into alphabet values (?1, ?2)",
                params![id as i64, letter.to_string()],
            )?;
        }

        let num_words = u32::try_from(self.vocabulary().len()).unwrap();
        for i in 0..num_words {
            tx.execute(
                "insert into words values (?1, ?2)",
                params![i64::from(i), self.word_by_id(i)],
            )?;
            tx.execute(
                "insert into counts values (?1, NULL, NULL, ?2)",
                params![i64::from(i), i64::from(self.unigram_count(i))],
            )?;
            for j in 0..num_words {
                let count2 = self.bigram_count(i, j);
                if count2 == 0 {
                    continue;
                }
                tx.execute(
                    "insert into counts values (?1, ?2, NULL, ?3)",
                    params![i64::from(i), i64::from(j), i64::from(count2)],
                )?;
                for k in 0..num_words {
                    let count3 = self.trigram_count(i, j, k);
                    if count3 > 0 {
                        tx.execute(
                            "insert into counts values (?1, ?2, ?3, ?4)",
                            params![
                                i64::from(i),
                                i64::from(j),
                                i64::from(k),
                                i64::from(count3)
                            ],
                        )?;
                    }
                }
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::tests::train_on;

    #[test]
    fn test_export_writes_all_three_tables() {
        let model = train_on("the cat sat on the mat", "sqlite-export");
        let mut path = std::env::temp_dir();
        path.push(format!("respell-{}-export.sqlite", std::process::id()));
        model.export_sqlite(&path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let words: i64 = conn
            .query_row("select count(*) from words", [], |row| row.get(0))
            .unwrap();
        assert_eq!(words, 5);
        let letters: i64 = conn
            .query_row("select count(*) from alphabet", [], |row| row.get(0))
            .unwrap();
        assert_eq!(letters, 26);
        let the: i64 = conn
            .query_row(
                "select count from counts where id_1 = ?1 and id_2 is null",
                [i64::from(model.word_id("the"))],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(the, 2);
        let bigrams: i64 = conn
            .query_row(
                "select count(*) from counts where id_2 is not null and id_3 is null",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(bigrams, 5);
        drop(conn);
        std::fs::remove_file(&path).unwrap();
    }
}
