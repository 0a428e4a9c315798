//! Single-file snapshot store
//!
//! File format:
//! ```text
//! [HEADER: 64 bytes]
//!   - magic: 8 bytes ("LDGRSNAP")
//!   - version: 4 bytes (u32 LE)
//!   - flags: 4 bytes
//!   - object_count: 8 bytes (u64 LE)
//!   - index_offset: 8 bytes (u64 LE)
//!   - roots_offset: 8 bytes (u64 LE)
//!   - roots_count: 8 bytes (u64 LE)
//!   - reserved: 16 bytes
//!
//! [RECORDS: variable]
//!   - compressed node records, concatenated
//!
//! [INDEX: variable]
//!   - sorted array of (hash, offset, size) entries
//!
//! [ROOTS: variable]
//!   - names (e.g. ledger sequence) → state root hashes
//! ```

use super::record::Record;
use super::{NodeSink, NodeStore};
use crate::model::{Hash256, TreeNode};
use crate::{Error, Result, MAGIC, VERSION};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

const HEADER_SIZE: u64 = 64;
const INDEX_ENTRY_SIZE: usize = 44;
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

#[derive(Clone, Copy, Debug)]
struct IndexEntry {
    offset: u64,
    size: u32,
}

/// A content-addressed node store backed by one file
///
/// Files are opened read-only by [`SnapshotFile::open`]; only files made by
/// [`SnapshotFile::create`] accept writes.
pub struct SnapshotFile {
    path: PathBuf,
    file: RwLock<File>,
    index: RwLock<HashMap<Hash256, IndexEntry>>,
    roots: RwLock<BTreeMap<String, Hash256>>,
    write_offset: RwLock<u64>,
    compression_level: i32,
    writable: bool,
    dirty: RwLock<bool>,
}

impl SnapshotFile {
    /// Create a new, writable snapshot file
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        Self::create_with_level(path, DEFAULT_COMPRESSION_LEVEL)
    }

    /// Create a new snapshot file compressing records at the given zstd level
    pub fn create_with_level(path: impl AsRef<Path>, compression_level: i32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        header[0..8].copy_from_slice(MAGIC);
        header[8..12].copy_from_slice(&VERSION.to_le_bytes());
        file.write_all(&header)?;
        file.sync_all()?;

        debug!(path = %path.display(), "created snapshot");

        Ok(SnapshotFile {
            path,
            file: RwLock::new(file),
            index: RwLock::new(HashMap::new()),
            roots: RwLock::new(BTreeMap::new()),
            write_offset: RwLock::new(HEADER_SIZE),
            compression_level,
            writable: true,
            dirty: RwLock::new(true),
        })
    }

    /// Open an existing snapshot file for reading
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new().read(true).open(&path)?;

        let mut header = [0u8; HEADER_SIZE as usize];
        file.read_exact(&mut header)
            .map_err(|_| Error::InvalidFile("Truncated header".into()))?;

        if &header[0..8] != MAGIC {
            return Err(Error::InvalidFile("Invalid magic bytes".into()));
        }

        let version = read_u32(&header[8..12]);
        if version != VERSION {
            return Err(Error::VersionMismatch {
                expected: VERSION,
                found: version,
            });
        }

        let object_count = read_u64(&header[16..24]);
        let index_offset = read_u64(&header[24..32]);
        let roots_offset = read_u64(&header[32..40]);
        let roots_count = read_u64(&header[40..48]);

        let file_len = file.metadata()?.len();
        if index_offset > file_len || roots_offset > file_len {
            return Err(Error::InvalidFile(format!(
                "Index or roots offset past end of file ({} bytes)",
                file_len
            )));
        }

        let mut index = HashMap::new();
        if index_offset > 0 && object_count > 0 {
            file.seek(SeekFrom::Start(index_offset))?;
            for _ in 0..object_count {
                let mut entry_buf = [0u8; INDEX_ENTRY_SIZE];
                file.read_exact(&mut entry_buf)?;

                let mut hash_bytes = [0u8; 32];
                hash_bytes.copy_from_slice(&entry_buf[0..32]);
                let hash = Hash256::from_bytes(hash_bytes);

                let entry = IndexEntry {
                    offset: read_u64(&entry_buf[32..40]),
                    size: read_u32(&entry_buf[40..44]),
                };
                // Records live between the header and the index
                let end = entry.offset.checked_add(entry.size as u64);
                if entry.offset < HEADER_SIZE || end.map_or(true, |end| end > index_offset) {
                    return Err(Error::InvalidFile(format!(
                        "Record for {} lies outside the record area",
                        hash
                    )));
                }
                index.insert(hash, entry);
            }
        }

        let mut roots = BTreeMap::new();
        if roots_offset > 0 && roots_count > 0 {
            file.seek(SeekFrom::Start(roots_offset))?;
            for _ in 0..roots_count {
                let mut len_buf = [0u8; 2];
                file.read_exact(&mut len_buf)?;
                let name_len = u16::from_le_bytes(len_buf) as usize;

                let mut name_buf = vec![0u8; name_len];
                file.read_exact(&mut name_buf)?;
                let name = String::from_utf8(name_buf)
                    .map_err(|_| Error::InvalidFile("Root name is not UTF-8".into()))?;

                let mut hash_buf = [0u8; 32];
                file.read_exact(&mut hash_buf)?;
                roots.insert(name, Hash256::from_bytes(hash_buf));
            }
        }

        debug!(
            path = %path.display(),
            objects = index.len(),
            roots = roots.len(),
            "opened snapshot"
        );

        Ok(SnapshotFile {
            path,
            file: RwLock::new(file),
            index: RwLock::new(index),
            roots: RwLock::new(roots),
            write_offset: RwLock::new(index_offset.max(HEADER_SIZE)),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            writable: false,
            dirty: RwLock::new(false),
        })
    }

    /// Store a node, returns its hash
    pub fn put_node(&self, node: &TreeNode) -> Result<Hash256> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }

        let hash = node.compute_hash();
        if self.index.read().contains_key(&hash) {
            return Ok(hash);
        }

        let compressed = Record::from_node(node)?.compress(self.compression_level)?;
        let size = u32::try_from(compressed.len())
            .map_err(|_| Error::Corruption(format!("Record for {} too large", hash)))?;

        let offset = {
            let mut write_offset = self.write_offset.write();
            let offset = *write_offset;

            let mut file = self.file.write();
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(&compressed)?;

            *write_offset = offset + size as u64;
            offset
        };

        self.index.write().insert(hash, IndexEntry { offset, size });
        *self.dirty.write() = true;
        Ok(hash)
    }

    /// Name a state root, e.g. by ledger sequence
    pub fn set_root(&self, name: &str, hash: Hash256) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }
        if name.len() > u16::MAX as usize {
            return Err(Error::InvalidFile(format!("Root name too long: {}", name.len())));
        }
        self.roots.write().insert(name.to_string(), hash);
        *self.dirty.write() = true;
        Ok(())
    }

    /// Look up a named root
    pub fn root(&self, name: &str) -> Option<Hash256> {
        self.roots.read().get(name).copied()
    }

    /// All named roots, sorted by name
    pub fn roots(&self) -> Vec<(String, Hash256)> {
        self.roots
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Resolve either a hex hash or a root name
    pub fn resolve(&self, name_or_hash: &str) -> Result<Hash256> {
        if let Some(hash) = self.root(name_or_hash) {
            return Ok(hash);
        }
        name_or_hash.parse()
    }

    pub fn object_count(&self) -> usize {
        self.index.read().len()
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Write index and roots after the records and update the header
    pub fn sync(&self) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }

        let index = self.index.read();
        let roots = self.roots.read();
        let write_offset = *self.write_offset.read();
        let mut file = self.file.write();

        let roots_offset = write_offset + (index.len() * INDEX_ENTRY_SIZE) as u64;

        file.seek(SeekFrom::Start(16))?;
        file.write_all(&(index.len() as u64).to_le_bytes())?;
        file.write_all(&write_offset.to_le_bytes())?;
        file.write_all(&roots_offset.to_le_bytes())?;
        file.write_all(&(roots.len() as u64).to_le_bytes())?;

        file.seek(SeekFrom::Start(write_offset))?;

        // Sort by hash for determinism
        let mut entries: Vec<_> = index.iter().collect();
        entries.sort_by_key(|(h, _)| **h);

        for (hash, entry) in entries {
            file.write_all(hash.as_bytes())?;
            file.write_all(&entry.offset.to_le_bytes())?;
            file.write_all(&entry.size.to_le_bytes())?;
        }

        for (name, hash) in roots.iter() {
            let name_bytes = name.as_bytes();
            file.write_all(&(name_bytes.len() as u16).to_le_bytes())?;
            file.write_all(name_bytes)?;
            file.write_all(hash.as_bytes())?;
        }

        let end = file.stream_position()?;
        file.set_len(end)?;
        file.sync_all()?;
        *self.dirty.write() = false;

        debug!(objects = index.len(), roots = roots.len(), "synced snapshot");
        Ok(())
    }
}

impl SnapshotFile {
    /// Positional read under a shared lock, so concurrent lookups don't queue
    #[cfg(unix)]
    fn read_record(&self, entry: IndexEntry) -> Result<Vec<u8>> {
        use std::os::unix::fs::FileExt;

        let mut data = vec![0u8; entry.size as usize];
        self.file.read().read_exact_at(&mut data, entry.offset)?;
        Ok(data)
    }

    #[cfg(not(unix))]
    fn read_record(&self, entry: IndexEntry) -> Result<Vec<u8>> {
        let mut data = vec![0u8; entry.size as usize];
        let mut file = self.file.write();
        file.seek(SeekFrom::Start(entry.offset))?;
        file.read_exact(&mut data)?;
        Ok(data)
    }
}

impl NodeStore for SnapshotFile {
    fn get(&self, hash: &Hash256) -> Result<TreeNode> {
        let entry = self
            .index
            .read()
            .get(hash)
            .copied()
            .ok_or(Error::NotFound(*hash))?;

        trace!(hash = %hash.short(), offset = entry.offset, "read record");

        let data = self.read_record(entry)?;
        Record::decompress(&data)?.to_node()
    }

    fn contains(&self, hash: &Hash256) -> bool {
        self.index.read().contains_key(hash)
    }
}

impl NodeSink for SnapshotFile {
    fn put(&self, node: &TreeNode) -> Result<Hash256> {
        self.put_node(node)
    }
}

impl Drop for SnapshotFile {
    fn drop(&mut self) {
        let dirty = *self.dirty.read();
        if self.writable && dirty {
            if let Err(e) = self.sync() {
                warn!(path = %self.path.display(), error = %e, "failed to sync snapshot on drop");
            }
        }
    }
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InnerNode, LeafNode, NodeKind};
    use tempfile::tempdir;

    fn sample_leaf(seed: &[u8]) -> TreeNode {
        LeafNode::new(NodeKind::AccountRoot, Hash256::digest(seed), seed.to_vec()).into()
    }

    #[test]
    fn test_create_and_open_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.lds");

        {
            let snapshot = SnapshotFile::create(&path).unwrap();
            assert_eq!(snapshot.object_count(), 0);
        }

        let snapshot = SnapshotFile::open(&path).unwrap();
        assert_eq!(snapshot.object_count(), 0);
        assert!(snapshot.roots().is_empty());
        assert!(!snapshot.is_writable());
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nodes.lds");

        let leaf = sample_leaf(b"alice");
        let mut inner = InnerNode::new();
        let leaf_hash;
        let inner_hash;
        {
            let snapshot = SnapshotFile::create(&path).unwrap();
            leaf_hash = snapshot.put_node(&leaf).unwrap();
            inner.set_child(3, leaf_hash);
            inner_hash = snapshot.put_node(&inner.clone().into()).unwrap();
            snapshot.set_root("38129", inner_hash).unwrap();
            snapshot.sync().unwrap();
        }

        let snapshot = SnapshotFile::open(&path).unwrap();
        assert_eq!(snapshot.object_count(), 2);
        assert_eq!(snapshot.get(&leaf_hash).unwrap(), leaf);
        assert_eq!(snapshot.get(&inner_hash).unwrap(), TreeNode::Inner(inner));
        assert_eq!(snapshot.root("38129"), Some(inner_hash));
        assert_eq!(snapshot.resolve("38129").unwrap(), inner_hash);
        assert_eq!(snapshot.resolve(&leaf_hash.to_hex()).unwrap(), leaf_hash);
    }

    #[test]
    fn test_deduplication() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::create(dir.path().join("dup.lds")).unwrap();

        let leaf = sample_leaf(b"dup");
        let h1 = snapshot.put_node(&leaf).unwrap();
        let h2 = snapshot.put_node(&leaf).unwrap();

        assert_eq!(h1, h2);
        assert_eq!(snapshot.object_count(), 1);
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.lds");
        SnapshotFile::create(&path).unwrap().sync().unwrap();

        let snapshot = SnapshotFile::open(&path).unwrap();
        assert!(matches!(snapshot.put_node(&sample_leaf(b"x")), Err(Error::ReadOnly)));
        assert!(matches!(snapshot.set_root("1", Hash256::ZERO), Err(Error::ReadOnly)));
        assert!(matches!(snapshot.sync(), Err(Error::ReadOnly)));
    }

    #[test]
    fn test_missing_node_is_not_found() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::create(dir.path().join("miss.lds")).unwrap();
        let missing = Hash256::digest(b"nothing");
        assert!(snapshot.get(&missing).unwrap_err().is_not_found());
    }

    #[test]
    fn test_bad_magic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.lds");
        std::fs::write(&path, [7u8; 64]).unwrap();
        assert!(matches!(SnapshotFile::open(&path), Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_oversized_index_entry_rejected_on_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad-index.lds");
        {
            let snapshot = SnapshotFile::create(&path).unwrap();
            snapshot.put_node(&sample_leaf(b"alice")).unwrap();
            snapshot.sync().unwrap();
        }

        let mut bytes = std::fs::read(&path).unwrap();
        let index_offset = read_u64(&bytes[24..32]) as usize;
        bytes[index_offset + 40..index_offset + 44].copy_from_slice(&u32::MAX.to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(SnapshotFile::open(&path), Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_index_offset_past_end_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.lds");
        SnapshotFile::create(&path).unwrap().sync().unwrap();

        let mut bytes = std::fs::read(&path).unwrap();
        bytes[24..32].copy_from_slice(&(1u64 << 40).to_le_bytes());
        std::fs::write(&path, &bytes).unwrap();

        assert!(matches!(SnapshotFile::open(&path), Err(Error::InvalidFile(_))));
    }

    #[test]
    fn test_leaf_with_inner_kind_not_written() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::create(dir.path().join("kind.lds")).unwrap();
        let odd: TreeNode =
            LeafNode::new(NodeKind::Inner, Hash256::digest(b"odd"), b"x".to_vec()).into();

        assert!(matches!(snapshot.put_node(&odd), Err(Error::Corruption(_))));
        assert_eq!(snapshot.object_count(), 0);
    }

    #[test]
    fn test_concurrent_reads_share_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.lds");
        let seeds: Vec<Vec<u8>> = (0u8..32).map(|i| vec![i; 3]).collect();
        let hashes: Vec<Hash256> = {
            let snapshot = SnapshotFile::create(&path).unwrap();
            let hashes = seeds
                .iter()
                .map(|s| snapshot.put_node(&sample_leaf(s)).unwrap())
                .collect();
            snapshot.sync().unwrap();
            hashes
        };

        let snapshot = SnapshotFile::open(&path).unwrap();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for (seed, hash) in seeds.iter().zip(&hashes) {
                        assert_eq!(snapshot.get(hash).unwrap(), sample_leaf(seed));
                    }
                });
            }
        });
    }

    #[test]
    fn test_resolve_rejects_unknown_name() {
        let dir = tempdir().unwrap();
        let snapshot = SnapshotFile::create(dir.path().join("names.lds")).unwrap();
        assert!(matches!(snapshot.resolve("99943"), Err(Error::InvalidHash(_))));
    }
}
