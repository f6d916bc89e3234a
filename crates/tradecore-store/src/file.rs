//! Durable event store backed by an append-only JSON-lines journal.
//!
//! # Format
//! ```text
//! {"crc":1234,"batch":{"uniques":[...],"events":[...]}}\n   <- one committed batch
//! {"crc":5678,"batch":{"uniques":[...],"events":[...]}}\n
//! ```
//!
//! `crc` is the CRC32C of the serialized `batch` object.
//!
//! A batch is committed once its line, including the trailing newline, has
//! been written and `sync_data` has returned. On open, the journal is
//! replayed into memory; an unterminated final line is the remains of an
//! interrupted append and is truncated away. Any other unreadable line is
//! corruption and fails the open, as does a checksum mismatch.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crc32c::crc32c;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tradecore_types::{Result, SequenceId, TradecoreError};

use crate::index::LogIndex;
use crate::{EventRecord, EventStore, UniqueKeyRecord};

/// One committed batch.
#[derive(Debug, Serialize, Deserialize)]
struct Batch {
    uniques: Vec<UniqueKeyRecord>,
    events: Vec<EventRecord>,
}

impl Batch {
    fn checksum(&self) -> Result<u32> {
        Ok(crc32c(&serde_json::to_vec(self)?))
    }
}

/// One journal line.
#[derive(Debug, Serialize, Deserialize)]
struct BatchLine {
    crc: u32,
    batch: Batch,
}

#[derive(Debug)]
struct Journal {
    file: File,
    /// Length of the committed prefix.
    len: u64,
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    log: RwLock<LogIndex>,
    /// Serializes writers; always taken before `log`.
    journal: Mutex<Journal>,
}

impl FileStore {
    /// Open (or create) the journal at `path` and load it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let mut log = LogIndex::default();
        let mut committed = 0usize;
        for (line_no, chunk) in bytes.split_inclusive(|b| *b == b'\n').enumerate() {
            if chunk.last() != Some(&b'\n') {
                warn!(
                    path = %path.display(),
                    offset = committed,
                    bytes = chunk.len(),
                    "dropping unterminated journal tail"
                );
                break;
            }
            let corrupted = |reason: String| TradecoreError::StoreCorrupted {
                reason: format!("{} line {}: {reason}", path.display(), line_no + 1),
            };
            let line: BatchLine = serde_json::from_slice(&chunk[..chunk.len() - 1])
                .map_err(|e| corrupted(e.to_string()))?;
            let crc = line.batch.checksum()?;
            if crc != line.crc {
                return Err(corrupted(format!(
                    "checksum mismatch: stored {:08x}, computed {crc:08x}",
                    line.crc
                )));
            }
            let Batch { uniques, events } = line.batch;
            log.check(&uniques, &events).map_err(|e| corrupted(e.to_string()))?;
            log.apply(&uniques, &events);
            committed += chunk.len();
        }

        let len = committed as u64;
        if len < bytes.len() as u64 {
            truncate_to(&mut file, len)?;
            file.sync_data()?;
        } else {
            file.seek(SeekFrom::Start(len))?;
        }

        info!(
            path = %path.display(),
            events = log.len(),
            max_sequence_id = log.max_sequence_id(),
            "journal loaded"
        );
        Ok(Self {
            path,
            log: RwLock::new(log),
            journal: Mutex::new(Journal { file, len }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EventStore for FileStore {
    fn append(&self, uniques: &[UniqueKeyRecord], events: &[EventRecord]) -> Result<()> {
        if uniques.is_empty() && events.is_empty() {
            return Ok(());
        }
        let mut journal = self.journal.lock();
        self.log.read().check(uniques, events)?;

        let batch = Batch {
            uniques: uniques.to_vec(),
            events: events.to_vec(),
        };
        let mut line = serde_json::to_vec(&BatchLine {
            crc: batch.checksum()?,
            batch,
        })?;
        line.push(b'\n');

        if let Err(err) = write_line(&mut journal.file, &line) {
            // Cut any partial line so the next append starts clean.
            let committed = journal.len;
            if let Err(rollback) = truncate_to(&mut journal.file, committed) {
                return Err(TradecoreError::StoreCorrupted {
                    reason: format!("append failed ({err}) and rollback failed ({rollback})"),
                });
            }
            return Err(err.into());
        }
        journal.len += line.len() as u64;

        self.log.write().apply(uniques, events);
        Ok(())
    }

    fn has_unique_id(&self, unique_id: &str) -> Result<bool> {
        Ok(self.log.read().has_unique_id(unique_id))
    }

    fn load_events_after(&self, after: SequenceId, limit: usize) -> Result<Vec<EventRecord>> {
        Ok(self.log.read().load_after(after, limit))
    }

    fn last_event(&self) -> Result<Option<EventRecord>> {
        Ok(self.log.read().last())
    }
}

fn write_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line)?;
    file.sync_data()
}

fn truncate_to(file: &mut File, len: u64) -> std::io::Result<()> {
    file.set_len(len)?;
    file.seek(SeekFrom::Start(len))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn record(sequence_id: SequenceId) -> EventRecord {
        EventRecord {
            sequence_id,
            previous_id: sequence_id - 1,
            data: format!("{{\"n\":{sequence_id}}}"),
            created_at: 1_700_000_000_000,
        }
    }

    fn key(unique_id: &str, sequence_id: SequenceId) -> UniqueKeyRecord {
        UniqueKeyRecord {
            unique_id: unique_id.into(),
            sequence_id,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        {
            let store = FileStore::open(&path).unwrap();
            store.append(&[key("a", 1)], &[record(1), record(2)]).unwrap();
            store.append(&[], &[record(3)]).unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.max_sequence_id().unwrap(), 3);
        assert!(store.has_unique_id("a").unwrap());
        assert_eq!(store.load_events_after(0, 10).unwrap().len(), 3);
        store.append(&[], &[record(4)]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 3);
    }

    #[test]
    fn torn_tail_is_truncated() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        {
            let store = FileStore::open(&path).unwrap();
            store.append(&[], &[record(1)]).unwrap();
        }
        let good_len = fs::metadata(&path).unwrap().len();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"{\"crc\":1,\"batch\":{\"uniques\":[],\"events\":[{\"sequence_id\":2,").unwrap();
        drop(file);

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.max_sequence_id().unwrap(), 1);
        assert_eq!(fs::metadata(&path).unwrap().len(), good_len);

        // The next batch lands on a clean line boundary.
        store.append(&[], &[record(2)]).unwrap();
        drop(store);
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.max_sequence_id().unwrap(), 2);
    }

    #[test]
    fn corrupted_middle_line_fails_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        {
            let store = FileStore::open(&path).unwrap();
            store.append(&[], &[record(1)]).unwrap();
        }
        let mut text = fs::read_to_string(&path).unwrap();
        text.insert_str(0, "garbage\n");
        fs::write(&path, text).unwrap();

        let err = FileStore::open(&path).unwrap_err();
        assert!(matches!(err, TradecoreError::StoreCorrupted { .. }));
    }

    #[test]
    fn flipped_byte_fails_checksum() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        {
            let store = FileStore::open(&path).unwrap();
            store.append(&[], &[record(1)]).unwrap();
            store.append(&[], &[record(2)]).unwrap();
        }
        // Still valid JSON, so only the checksum can catch it.
        let mut bytes = fs::read(&path).unwrap();
        let at = bytes
            .windows(13)
            .position(|w| w == b"1700000000000")
            .unwrap();
        bytes[at + 12] = b'7';
        fs::write(&path, bytes).unwrap();

        let err = FileStore::open(&path).unwrap_err();
        match err {
            TradecoreError::StoreCorrupted { reason } => {
                assert!(reason.contains("line 1"), "{reason}");
                assert!(reason.contains("checksum"), "{reason}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn rejected_batch_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.log");
        let store = FileStore::open(&path).unwrap();
        store.append(&[key("a", 1)], &[record(1)]).unwrap();
        let before = fs::metadata(&path).unwrap().len();

        let err = store.append(&[key("a", 2)], &[record(2)]).unwrap_err();
        assert!(matches!(err, TradecoreError::StoreConflict { .. }));
        assert_eq!(fs::metadata(&path).unwrap().len(), before);
        assert_eq!(store.max_sequence_id().unwrap(), 1);
    }
}
