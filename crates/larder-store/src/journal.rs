use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::mutation::Mutation;
use crate::state::CatalogState;

/// One journal entry.
///
/// On-disk format:
/// ```text
/// [4 bytes: payload length (little-endian u32)]
/// [4 bytes: CRC32 of payload (little-endian u32)]
/// [N bytes: payload (bincode-serialized JournalRecord)]
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum JournalRecord {
    /// A committed mutation.
    Mutation(Mutation),
    /// The complete catalog; replaces everything recorded before it.
    Snapshot(CatalogState),
}

/// Flush/sync strategy for the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// `fsync` after every append.
    EveryWrite,
    /// Flush to the OS and rely on its page cache.
    #[default]
    OsDefault,
}

/// Where and how the journal is written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub sync_mode: SyncMode,
}

impl JournalConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sync_mode: SyncMode::default(),
        }
    }
}

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: usize = 8;

struct JournalWriter {
    writer: BufWriter<File>,
    /// Current end of the file.
    offset: u64,
}

/// Append-only catalog journal.
///
/// Records are written with a length prefix and a CRC32 checksum. Recovery
/// reads the file front to back, skipping entries whose checksum fails and
/// stopping at a truncated tail.
pub struct Journal {
    path: PathBuf,
    writer: Mutex<JournalWriter>,
    sync_mode: SyncMode,
}

impl Journal {
    /// Open (or create) the journal file described by `config`.
    pub fn open(config: &JournalConfig) -> StoreResult<Self> {
        let path = config.path.as_path();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let offset = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(JournalWriter {
                writer: BufWriter::new(file),
                offset,
            }),
            sync_mode: config.sync_mode,
        })
    }

    /// Append one record. Returns the byte offset it was written at.
    ///
    /// If the write fails part way the file is cut back to its previous
    /// length, so a failed append leaves no torn entry behind.
    pub fn append(&self, record: &JournalRecord) -> StoreResult<u64> {
        let payload = encode(record)?;
        let mut w = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        let entry_offset = w.offset;

        if let Err(e) = write_frame(&mut w.writer, &payload, self.sync_mode) {
            warn!(offset = entry_offset, error = %e, "journal append failed; rolling back");
            let fresh = BufWriter::new(OpenOptions::new().read(true).append(true).open(&self.path)?);
            let (file, _unwritten) = std::mem::replace(&mut w.writer, fresh).into_parts();
            file.set_len(entry_offset)?;
            return Err(e.into());
        }

        w.offset += (HEADER_SIZE + payload.len()) as u64;
        debug!(offset = entry_offset, len = payload.len(), "journal append");
        Ok(entry_offset)
    }

    /// Read back every valid record.
    pub fn recover(&self) -> StoreResult<Vec<JournalRecord>> {
        let mut data = Vec::new();
        BufReader::new(File::open(&self.path)?).read_to_end(&mut data)?;

        let file_len = data.len();
        let mut records = Vec::new();
        let mut offset = 0usize;

        while offset + HEADER_SIZE <= file_len {
            let length = u32::from_le_bytes([
                data[offset],
                data[offset + 1],
                data[offset + 2],
                data[offset + 3],
            ]) as usize;
            let expected_crc = u32::from_le_bytes([
                data[offset + 4],
                data[offset + 5],
                data[offset + 6],
                data[offset + 7],
            ]);

            let start = offset + HEADER_SIZE;
            if length == 0 || start + length > file_len {
                warn!(offset, length, file_len, "truncated journal entry; stopping recovery");
                break;
            }

            let payload = &data[start..start + length];
            let actual_crc = crc32fast::hash(payload);
            if actual_crc != expected_crc {
                warn!(
                    offset,
                    expected = expected_crc,
                    actual = actual_crc,
                    "CRC mismatch; skipping journal entry"
                );
            } else {
                match bincode::deserialize::<JournalRecord>(payload) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        warn!(offset, error = %e, "undecodable journal entry; skipping");
                    }
                }
            }
            offset = start + length;
        }

        debug!(recovered = records.len(), "journal recovery complete");
        Ok(records)
    }

    /// Replace the journal contents with a single snapshot of `state`.
    ///
    /// The snapshot is written to a temporary file beside the journal and
    /// renamed over it, so a crash leaves either the old or the new file.
    pub fn compact(&self, state: &CatalogState) -> StoreResult<()> {
        let payload = encode(&JournalRecord::Snapshot(state.clone()))?;
        let mut w = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        w.writer.flush()?;

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        write_frame(tmp.as_file_mut(), &payload, SyncMode::EveryWrite)?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;

        let file = OpenOptions::new().read(true).append(true).open(&self.path)?;
        w.offset = file.metadata()?.len();
        w.writer = BufWriter::new(file);

        debug!(bytes = w.offset, "journal compacted");
        Ok(())
    }

    /// Current end offset of the journal.
    pub fn offset(&self) -> StoreResult<u64> {
        Ok(self.writer.lock().map_err(|_| StoreError::LockPoisoned)?.offset)
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("path", &self.path)
            .field("sync_mode", &self.sync_mode)
            .finish()
    }
}

fn encode(record: &JournalRecord) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
    if payload.len() > u32::MAX as usize {
        return Err(StoreError::Serialization(format!(
            "journal record of {} bytes is too large",
            payload.len()
        )));
    }
    Ok(payload)
}

fn write_frame<W: Write + AsFile>(out: &mut W, payload: &[u8], sync: SyncMode) -> io::Result<()> {
    let length = payload.len() as u32;
    let crc = crc32fast::hash(payload);
    out.write_all(&length.to_le_bytes())?;
    out.write_all(&crc.to_le_bytes())?;
    out.write_all(payload)?;
    out.flush()?;
    if sync == SyncMode::EveryWrite {
        out.file().sync_all()?;
    }
    Ok(())
}

/// Writers backed by a real file that can be synced.
trait AsFile {
    fn file(&self) -> &File;
}

impl AsFile for BufWriter<File> {
    fn file(&self) -> &File {
        self.get_ref()
    }
}

impl AsFile for File {
    fn file(&self) -> &File {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    use larder_types::{Category, CategoryId};

    fn make_record(name: &str) -> JournalRecord {
        JournalRecord::Mutation(Mutation::CreateCategory(Category {
            id: CategoryId::new(),
            name: name.into(),
        }))
    }

    fn open(path: &Path) -> Journal {
        Journal::open(&JournalConfig::new(path)).unwrap()
    }

    #[test]
    fn append_and_recover_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let journal = open(&dir.path().join("catalog.journal"));

        let records = vec![make_record("A"), make_record("B"), make_record("C")];
        for r in &records {
            journal.append(r).unwrap();
        }
        assert_eq!(journal.recover().unwrap(), records);
    }

    #[test]
    fn recover_empty_journal() {
        let dir = tempfile::tempdir().unwrap();
        let journal = open(&dir.path().join("empty.journal"));
        assert!(journal.recover().unwrap().is_empty());
        assert_eq!(journal.offset().unwrap(), 0);
    }

    #[test]
    fn open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/catalog.journal");
        let journal = open(&path);
        journal.append(&make_record("A")).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn append_returns_increasing_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let journal = open(&dir.path().join("offsets.journal"));
        let a = journal.append(&make_record("A")).unwrap();
        let b = journal.append(&make_record("B")).unwrap();
        assert_eq!(a, 0);
        assert!(b > a);
        assert!(journal.offset().unwrap() > b);
    }

    #[test]
    fn reopen_continues_at_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reopen.journal");
        let first = make_record("A");
        let second = make_record("B");
        {
            let journal = open(&path);
            journal.append(&first).unwrap();
        }
        let journal = open(&path);
        journal.append(&second).unwrap();
        assert_eq!(journal.recover().unwrap(), vec![first, second]);
    }

    #[test]
    fn crc_mismatch_skips_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.journal");
        let second = make_record("B");
        {
            let journal = open(&path);
            journal.append(&make_record("A")).unwrap();
            journal.append(&second).unwrap();
        }
        {
            let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xFF;
            file.seek(SeekFrom::Start(HEADER_SIZE as u64)).unwrap();
            file.write_all(&buf).unwrap();
            file.sync_all().unwrap();
        }
        let journal = open(&path);
        assert_eq!(journal.recover().unwrap(), vec![second]);
    }

    #[test]
    fn truncated_tail_is_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tail.journal");
        let first = make_record("A");
        let total = {
            let journal = open(&path);
            journal.append(&first).unwrap();
            journal.append(&make_record("B")).unwrap();
            journal.offset().unwrap()
        };
        {
            let file = OpenOptions::new().write(true).open(&path).unwrap();
            file.set_len(total - 3).unwrap();
        }
        let journal = open(&path);
        assert_eq!(journal.recover().unwrap(), vec![first]);
    }

    #[test]
    fn compact_leaves_single_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("compact.journal");
        let journal = open(&path);

        let mut state = CatalogState::new();
        for name in ["A", "B", "C"] {
            let record = make_record(name);
            if let JournalRecord::Mutation(m) = &record {
                state.apply(m).unwrap();
            }
            journal.append(&record).unwrap();
        }

        journal.compact(&state).unwrap();
        let records = journal.recover().unwrap();
        assert_eq!(records, vec![JournalRecord::Snapshot(state.clone())]);

        // Appends after compaction land after the snapshot.
        let next = make_record("D");
        journal.append(&next).unwrap();
        let records = journal.recover().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1], next);
    }

    #[test]
    fn every_write_sync_mode() {
        let dir = tempfile::tempdir().unwrap();
        let config = JournalConfig {
            path: dir.path().join("sync.journal"),
            sync_mode: SyncMode::EveryWrite,
        };
        let journal = Journal::open(&config).unwrap();
        journal.append(&make_record("A")).unwrap();
        assert_eq!(journal.recover().unwrap().len(), 1);
    }
}
