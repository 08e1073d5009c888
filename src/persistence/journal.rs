//! Append-only mutation journal
//!
//! Every committed mutation of a durable repository is appended here before
//! it becomes visible in memory, so the journal always holds at least the
//! state readers can observe. Records are length-prefixed, carry a
//! monotonically increasing sequence number, and are checksummed so replay
//! can detect torn or corrupted writes.

use super::stored::StoredStatement;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Journal errors
#[derive(Error, Debug)]
pub enum JournalError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Encoding(#[from] bincode::Error),

    /// Corruption detected
    #[error("Journal corruption detected at sequence {0}")]
    Corruption(u64),

    /// Invalid journal entry
    #[error("Invalid journal entry: {0}")]
    InvalidEntry(String),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// Journal entry types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JournalEntry {
    /// Statements inserted in one committed mutation
    Insert { statements: Vec<StoredStatement> },
    /// Statements deleted in one committed mutation
    Delete { statements: Vec<StoredStatement> },
    /// A changeset committed as one unit: deletes apply before inserts
    Apply {
        deletes: Vec<StoredStatement>,
        inserts: Vec<StoredStatement>,
    },
    /// Repository cleared
    Clear,
}

/// Journal record with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalRecord {
    /// Sequence number (monotonically increasing)
    sequence: u64,
    /// Entry data
    entry: JournalEntry,
    /// CRC32 checksum for corruption detection
    checksum: u32,
}

impl JournalRecord {
    fn new(sequence: u64, entry: JournalEntry) -> Self {
        let mut record = Self {
            sequence,
            entry,
            checksum: 0,
        };
        record.checksum = record.calculate_checksum();
        record
    }

    fn calculate_checksum(&self) -> u32 {
        let bytes = bincode::serialize(&self.entry).unwrap_or_default();
        crc32fast::hash(&bytes)
    }

    fn verify_checksum(&self) -> bool {
        self.checksum == self.calculate_checksum()
    }
}

/// Append-only journal manager
pub struct Journal {
    /// Path to the journal directory
    path: PathBuf,
    /// Current journal file
    current_file: Option<BufWriter<File>>,
    /// Current sequence number
    sequence: u64,
    /// Sync mode (flush after every write)
    sync_mode: bool,
}

impl Journal {
    /// Open a journal directory, resuming after any existing segments
    pub fn new(path: impl AsRef<Path>) -> JournalResult<Self> {
        let path = path.as_ref().to_path_buf();

        std::fs::create_dir_all(&path)?;

        let sequence = Self::find_latest_sequence(&path)?;

        info!("Initializing journal at {:?}, sequence: {}", path, sequence);

        Ok(Self {
            path,
            current_file: None,
            sequence,
            sync_mode: false,
        })
    }

    /// Set sync mode
    pub fn set_sync_mode(&mut self, sync: bool) {
        self.sync_mode = sync;
        debug!("Journal sync mode: {}", sync);
    }

    /// Current sequence number
    pub fn current_sequence(&self) -> u64 {
        self.sequence
    }

    /// Append an entry to the journal
    pub fn append(&mut self, entry: JournalEntry) -> JournalResult<u64> {
        self.sequence += 1;
        let sequence = self.sequence;

        let record = JournalRecord::new(sequence, entry);
        let data = bincode::serialize(&record)?;

        if self.current_file.is_none() {
            self.open_new_file()?;
        }

        if let Some(ref mut file) = self.current_file {
            // Length prefix (4 bytes), then the record
            file.write_all(&(data.len() as u32).to_le_bytes())?;
            file.write_all(&data)?;

            if self.sync_mode {
                file.flush()?;
            }
        }

        Ok(sequence)
    }

    /// Force flush the journal
    pub fn flush(&mut self) -> JournalResult<()> {
        if let Some(ref mut file) = self.current_file {
            file.flush()?;
        }
        Ok(())
    }

    /// Replay the journal from a specific sequence number
    pub fn replay<F>(&self, from_sequence: u64, mut callback: F) -> JournalResult<u64>
    where
        F: FnMut(&JournalEntry) -> JournalResult<()>,
    {
        debug!("Replaying journal from sequence {}", from_sequence);

        let files = self.segment_files()?;
        let mut replayed = 0u64;
        let mut last_sequence = from_sequence;

        for file_path in files {
            let file = File::open(&file_path)?;
            let mut reader = BufReader::new(file);
            let mut buf = Vec::new();

            loop {
                let mut len_bytes = [0u8; 4];
                match reader.read_exact(&mut len_bytes) {
                    Ok(_) => {}
                    Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
                    Err(e) => return Err(e.into()),
                }

                let len = u32::from_le_bytes(len_bytes) as usize;

                buf.resize(len, 0);
                reader.read_exact(&mut buf)?;

                let record: JournalRecord = bincode::deserialize(&buf)?;

                if !record.verify_checksum() {
                    warn!("Journal corruption detected at sequence {}", record.sequence);
                    return Err(JournalError::Corruption(record.sequence));
                }

                if record.sequence < from_sequence {
                    continue;
                }

                callback(&record.entry)?;
                replayed += 1;
                last_sequence = record.sequence;
            }
        }

        debug!(
            "Replayed {} journal entries, last sequence: {}",
            replayed, last_sequence
        );
        Ok(last_sequence)
    }

    /// Delete all journal segments
    ///
    /// Safe only while the owner holds exclusive access and has captured the
    /// journaled state elsewhere (a freshly written checkpoint).
    pub fn reset(&mut self) -> JournalResult<()> {
        self.current_file = None;

        let files = self.segment_files()?;
        let count = files.len();
        for file_path in files {
            std::fs::remove_file(file_path)?;
        }

        info!("Removed {} journal segments", count);
        Ok(())
    }

    /// Open a new journal segment
    fn open_new_file(&mut self) -> JournalResult<()> {
        let filename = format!("journal-{:016x}.log", self.sequence);
        let file_path = self.path.join(filename);

        debug!("Opening new journal segment: {:?}", file_path);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        self.current_file = Some(BufWriter::new(file));
        Ok(())
    }

    /// Find the latest sequence number from existing segments
    fn find_latest_sequence(path: &Path) -> JournalResult<u64> {
        let files = match std::fs::read_dir(path) {
            Ok(entries) => entries,
            Err(_) => return Ok(0),
        };

        let mut max_sequence = 0u64;

        for entry in files.flatten() {
            if let Some(filename) = entry.file_name().to_str() {
                if let Some(seq_str) = filename
                    .strip_prefix("journal-")
                    .and_then(|s| s.strip_suffix(".log"))
                {
                    if let Ok(seq) = u64::from_str_radix(seq_str, 16) {
                        max_sequence = max_sequence.max(seq);
                    }
                }
            }
        }

        Ok(max_sequence)
    }

    /// Get all journal segments in sequence order
    fn segment_files(&self) -> JournalResult<Vec<PathBuf>> {
        let mut files = Vec::new();

        let entries = std::fs::read_dir(&self.path)?;

        for entry in entries.flatten() {
            if let Some(filename) = entry.file_name().to_str() {
                if filename.starts_with("journal-") && filename.ends_with(".log") {
                    files.push(entry.path());
                }
            }
        }

        // Filename embeds the sequence, so lexical order is replay order
        files.sort();

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::super::stored::StoredTerm;
    use super::*;
    use tempfile::TempDir;

    fn insert_entry(n: u64) -> JournalEntry {
        JournalEntry::Insert {
            statements: vec![StoredStatement {
                subject: StoredTerm::Iri(format!("http://example.org/s{}", n)),
                predicate: "http://example.org/p".to_string(),
                object: StoredTerm::Literal {
                    value: n.to_string(),
                    language: None,
                    datatype: None,
                },
                graph: None,
            }],
        }
    }

    #[test]
    fn test_journal_creation() {
        let temp_dir = TempDir::new().unwrap();
        let journal = Journal::new(temp_dir.path()).unwrap();
        assert_eq!(journal.current_sequence(), 0);
    }

    #[test]
    fn test_journal_append() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::new(temp_dir.path()).unwrap();

        let seq = journal.append(insert_entry(1)).unwrap();
        assert_eq!(seq, 1);

        journal.flush().unwrap();
    }

    #[test]
    fn test_journal_replay() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::new(temp_dir.path()).unwrap();

        for i in 1..=5 {
            journal.append(insert_entry(i)).unwrap();
        }
        journal.append(JournalEntry::Clear).unwrap();

        journal.flush().unwrap();

        let mut inserts = 0;
        let mut clears = 0;
        journal
            .replay(0, |entry| {
                match entry {
                    JournalEntry::Insert { .. } => inserts += 1,
                    JournalEntry::Clear => clears += 1,
                    _ => {}
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(inserts, 5);
        assert_eq!(clears, 1);
    }

    #[test]
    fn test_journal_resumes_sequence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut journal = Journal::new(temp_dir.path()).unwrap();
            for i in 1..=3 {
                journal.append(insert_entry(i)).unwrap();
            }
            journal.flush().unwrap();
        }

        let journal = Journal::new(temp_dir.path()).unwrap();
        // Resumes from the sequence embedded in the newest segment name
        assert_eq!(journal.current_sequence(), 1);

        let last = journal.replay(0, |_| Ok(())).unwrap();
        assert_eq!(last, 3);
    }

    #[test]
    fn test_journal_reset() {
        let temp_dir = TempDir::new().unwrap();
        let mut journal = Journal::new(temp_dir.path()).unwrap();

        for i in 1..=5 {
            journal.append(insert_entry(i)).unwrap();
        }
        journal.flush().unwrap();

        journal.reset().unwrap();

        let mut count = 0;
        journal
            .replay(0, |_| {
                count += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_corruption_detected() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut journal = Journal::new(temp_dir.path()).unwrap();
            journal.append(insert_entry(1)).unwrap();
            journal.flush().unwrap();
        }

        // Flip a byte in the record body, past the length prefix
        let segment = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
            .path();
        let mut bytes = std::fs::read(&segment).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        std::fs::write(&segment, bytes).unwrap();

        let journal = Journal::new(temp_dir.path()).unwrap();
        let result = journal.replay(0, |_| Ok(()));
        assert!(matches!(
            result,
            Err(JournalError::Corruption(_)) | Err(JournalError::Encoding(_))
        ));
    }
}
