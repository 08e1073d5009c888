//! Durable persistence for repositories
//!
//! A durable repository owns a directory holding a gzip-compressed
//! checkpoint of its full state plus an append-only journal of every
//! mutation committed since that checkpoint. Reopening the directory loads
//! the checkpoint and replays the journal tail; closing compacts the journal
//! back into a fresh checkpoint.

pub mod journal;
mod stored;

pub use journal::{Journal, JournalEntry, JournalError, JournalResult};
pub use stored::{StoredStatement, StoredTerm};

use crate::model::Statement;
use crate::store::StatementSet;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

const CHECKPOINT_FILE: &str = "checkpoint.bin";
const CHECKPOINT_TMP: &str = "checkpoint.tmp";
const JOURNAL_DIR: &str = "journal";

/// Checkpoint file contents
#[derive(Serialize, Deserialize)]
struct Checkpoint {
    /// Creation time, seconds since the epoch
    created_at: i64,
    statements: Vec<StoredStatement>,
}

/// The durable half of a repository: checkpoint file plus journal
pub(crate) struct Backing {
    dir: PathBuf,
    journal: Journal,
}

impl Backing {
    /// Open a durable location, restoring the last committed state
    pub fn open(dir: &Path) -> JournalResult<(Self, StatementSet)> {
        std::fs::create_dir_all(dir)?;

        info!("Opening durable repository at {:?}", dir);

        let mut statements = StatementSet::default();

        let checkpoint_path = dir.join(CHECKPOINT_FILE);
        if checkpoint_path.exists() {
            let file = File::open(&checkpoint_path)?;
            let checkpoint: Checkpoint =
                bincode::deserialize_from(GzDecoder::new(BufReader::new(file)))?;
            for stored in &checkpoint.statements {
                statements.insert(stored.decode()?);
            }
            info!(
                "Loaded {} statements from checkpoint created at {}",
                statements.len(),
                checkpoint.created_at
            );
        }

        let mut journal = Journal::new(dir.join(JOURNAL_DIR))?;
        // Mutations must hit disk before they become visible in memory
        journal.set_sync_mode(true);

        journal.replay(0, |entry| {
            match entry {
                JournalEntry::Insert { statements: batch } => {
                    for stored in batch {
                        statements.insert(stored.decode()?);
                    }
                }
                JournalEntry::Delete { statements: batch } => {
                    for stored in batch {
                        let statement = stored.decode()?;
                        statements.shift_remove(&statement);
                    }
                }
                JournalEntry::Apply { deletes, inserts } => {
                    for stored in deletes {
                        let statement = stored.decode()?;
                        statements.shift_remove(&statement);
                    }
                    for stored in inserts {
                        statements.insert(stored.decode()?);
                    }
                }
                JournalEntry::Clear => statements.clear(),
            }
            Ok(())
        })?;

        info!("Restored {} statements", statements.len());

        Ok((
            Self {
                dir: dir.to_path_buf(),
                journal,
            },
            statements,
        ))
    }

    /// Journal a batch of inserted statements
    pub fn record_insert<'a>(
        &mut self,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> JournalResult<()> {
        let statements: Vec<StoredStatement> =
            statements.into_iter().map(StoredStatement::from).collect();
        if statements.is_empty() {
            return Ok(());
        }
        self.journal.append(JournalEntry::Insert { statements })?;
        Ok(())
    }

    /// Journal a batch of deleted statements
    pub fn record_delete<'a>(
        &mut self,
        statements: impl IntoIterator<Item = &'a Statement>,
    ) -> JournalResult<()> {
        let statements: Vec<StoredStatement> =
            statements.into_iter().map(StoredStatement::from).collect();
        if statements.is_empty() {
            return Ok(());
        }
        self.journal.append(JournalEntry::Delete { statements })?;
        Ok(())
    }

    /// Journal an applied changeset as a single record
    ///
    /// One record keeps the changeset all-or-nothing on disk as well: a torn
    /// write fails the checksum on replay instead of surfacing half a
    /// changeset.
    pub fn record_apply<'a>(
        &mut self,
        deletes: impl IntoIterator<Item = &'a Statement>,
        inserts: impl IntoIterator<Item = &'a Statement>,
    ) -> JournalResult<()> {
        let deletes: Vec<StoredStatement> =
            deletes.into_iter().map(StoredStatement::from).collect();
        let inserts: Vec<StoredStatement> =
            inserts.into_iter().map(StoredStatement::from).collect();
        if deletes.is_empty() && inserts.is_empty() {
            return Ok(());
        }
        self.journal.append(JournalEntry::Apply { deletes, inserts })?;
        Ok(())
    }

    /// Journal a clear of the whole repository
    pub fn record_clear(&mut self) -> JournalResult<()> {
        self.journal.append(JournalEntry::Clear)?;
        Ok(())
    }

    /// Force the journal to disk
    pub fn flush(&mut self) -> JournalResult<()> {
        self.journal.flush()
    }

    /// Compact the journal into a fresh checkpoint of `statements`
    ///
    /// Requires exclusive access: every journaled mutation must already be
    /// reflected in `statements`.
    pub fn checkpoint(&mut self, statements: &StatementSet) -> JournalResult<()> {
        let checkpoint = Checkpoint {
            created_at: chrono::Utc::now().timestamp(),
            statements: statements.iter().map(StoredStatement::from).collect(),
        };

        // Write to a temporary file and rename, so a crash mid-write leaves
        // the previous checkpoint intact
        let tmp_path = self.dir.join(CHECKPOINT_TMP);
        let file = File::create(&tmp_path)?;
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        bincode::serialize_into(&mut encoder, &checkpoint)?;
        encoder.finish()?.flush()?;
        std::fs::rename(&tmp_path, self.dir.join(CHECKPOINT_FILE))?;

        self.journal.reset()?;

        info!(
            "Checkpointed {} statements at {:?}",
            checkpoint.statements.len(),
            self.dir
        );
        Ok(())
    }
}
