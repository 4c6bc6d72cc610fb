//! SQLite output backend (feature `sqlite`).
//!
//! Creates `output.db` in the configured output directory with two tables:
//! `daily_summaries` (the fixed columns) and `daily_infections` (one row per
//! day and activity type).

use std::path::Path;

use rusqlite::Connection;
use rusqlite::types::Value;

use crate::row::DAILY_COLUMNS;
use crate::writer::OutputWriter;
use crate::{DailySummaryRow, OutputResult};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:       Connection,
    activities: Vec<String>,
    finished:   bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path, activities: &[String]) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        // day and date lead; every count column is an INTEGER.
        let counts: Vec<String> =
            DAILY_COLUMNS[2..].iter().map(|c| format!("{c} INTEGER NOT NULL")).collect();
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS daily_summaries (
                 day  INTEGER PRIMARY KEY,
                 date TEXT NOT NULL,
                 {}
             );
             CREATE TABLE IF NOT EXISTS daily_infections (
                 day        INTEGER NOT NULL,
                 activity   TEXT    NOT NULL,
                 infections INTEGER NOT NULL,
                 PRIMARY KEY (day, activity)
             );",
            counts.join(",\n                 ")
        ))?;

        Ok(Self { conn, activities: activities.to_vec(), finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_daily(&mut self, row: &DailySummaryRow) -> OutputResult<()> {
        let placeholders: Vec<String> = (1..=DAILY_COLUMNS.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "INSERT INTO daily_summaries ({}) VALUES ({})",
            DAILY_COLUMNS.join(", "),
            placeholders.join(", ")
        );

        let mut values = vec![Value::Integer(i64::from(row.day)), Value::Text(row.date.to_string())];
        values.extend(row.counts().into_iter().map(|c| Value::Integer(c as i64)));

        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&sql)?;
            stmt.execute(rusqlite::params_from_iter(values))?;

            let mut inf = tx.prepare_cached(
                "INSERT INTO daily_infections (day, activity, infections) VALUES (?1, ?2, ?3)",
            )?;
            for (name, count) in self.activities.iter().zip(&row.infections_by_activity) {
                inf.execute(rusqlite::params![row.day, name, *count as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
