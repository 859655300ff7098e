use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use loam_crypto::ContentHasher;
use loam_types::{ObjectId, ObjectKind, RepoConfig, RepoLayout, StoreConfig, OBJECT_ID_HEX_LEN};
use tracing::debug;

use crate::compress::{compress, decompress};
use crate::error::{StoreError, StoreResult};
use crate::object::ContentObject;
use crate::traits::{normalize_prefix, ObjectStore};

/// Sharded on-disk object store.
///
/// Each object is one file at `objects/<hash[0:2]>/<hash[2:]>` holding the
/// compressed framing. Shard directories are created on demand.
#[derive(Clone, Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    config: StoreConfig,
}

impl LooseObjectStore {
    /// Store under `layout`'s objects directory with explicit settings.
    pub fn new(layout: &RepoLayout, config: StoreConfig) -> Self {
        Self {
            objects_dir: layout.objects_dir(),
            config,
        }
    }

    /// Store under `layout`, reading settings from the repository config file.
    pub fn open(layout: &RepoLayout) -> StoreResult<Self> {
        let config = RepoConfig::load(&layout.config_path())?;
        Ok(Self::new(layout, config.store))
    }

    /// The objects directory.
    pub fn objects_dir(&self) -> &Path {
        &self.objects_dir
    }

    /// Where the object with `id` lives (whether or not it exists).
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        self.objects_dir.join(id.shard()).join(id.file_name())
    }

    /// Hash, compress and persist a payload.
    ///
    /// Returns the object ID and the path of its file. If the file already
    /// exists it is left untouched.
    pub fn write_object(
        &self,
        kind: ObjectKind,
        payload: &[u8],
    ) -> StoreResult<(ObjectId, PathBuf)> {
        let framed = ContentHasher::frame(kind, payload);
        let id = ContentHasher::hash_framed(&framed);
        let path = self.object_path(&id);

        if path.is_file() {
            debug!(id = %id, "object already stored");
            return Ok((id, path));
        }

        let shard_dir = self.objects_dir.join(id.shard());
        fs::create_dir_all(&shard_dir)?;

        let compressed = compress(&framed, &self.config)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&shard_dir)?;
        tmp.write_all(&compressed)?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(
            id = %id,
            kind = %kind,
            size = payload.len(),
            stored = compressed.len(),
            "object written"
        );
        Ok((id, path))
    }

    /// Locate the file of the unique object whose hex id starts with `prefix`.
    pub fn find(&self, prefix: &str) -> StoreResult<PathBuf> {
        let prefix = normalize_prefix(prefix)?;
        let (shard, rest) = prefix.split_at(2);
        let shard_dir = self.objects_dir.join(shard);

        if prefix.len() == OBJECT_ID_HEX_LEN {
            let path = shard_dir.join(rest);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(StoreError::NotFound(prefix))
            };
        }

        let entries = match fs::read_dir(&shard_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(StoreError::NotFound(prefix)),
            Err(e) => return Err(e.into()),
        };

        let mut matches = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if is_object_file_name(name) && name.starts_with(rest) {
                matches.push(entry.path());
            }
        }

        match matches.len() {
            0 => Err(StoreError::NotFound(prefix)),
            1 => Ok(matches.remove(0)),
            n => Err(StoreError::AmbiguousPrefix { prefix, matches: n }),
        }
    }

    /// Read and decode the object file at `path` without verifying its hash.
    pub fn read_path(&self, path: &Path) -> StoreResult<ContentObject> {
        let label = path.display().to_string();
        let compressed = fs::read(path)?;
        let framed = decompress(&compressed).map_err(|e| StoreError::CorruptObject {
            object: label.clone(),
            reason: format!("decompression failed: {e}"),
        })?;
        ContentObject::from_framed(&label, &framed)
    }

    fn id_from_path(&self, path: &Path) -> StoreResult<ObjectId> {
        let file = path.file_name().and_then(|n| n.to_str());
        let shard = path
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str());
        match (shard, file) {
            (Some(shard), Some(file)) => ObjectId::from_hex(&format!("{shard}{file}")).map_err(
                |e| StoreError::CorruptObject {
                    object: path.display().to_string(),
                    reason: e.to_string(),
                },
            ),
            _ => Err(StoreError::NotFound(path.display().to_string())),
        }
    }
}

/// Object files are named by the 38 hex characters after the shard.
fn is_object_file_name(name: &str) -> bool {
    name.len() == OBJECT_ID_HEX_LEN - 2 && name.bytes().all(|b| b.is_ascii_hexdigit())
}

impl ObjectStore for LooseObjectStore {
    fn put(&self, kind: ObjectKind, payload: &[u8]) -> StoreResult<ObjectId> {
        self.write_object(kind, payload).map(|(id, _)| id)
    }

    fn get(&self, id: &ObjectId) -> StoreResult<ContentObject> {
        let path = self.find(&id.to_hex())?;
        let object = self.read_path(&path)?;
        let computed = object.compute_id();
        if computed != *id {
            return Err(StoreError::HashMismatch {
                expected: *id,
                computed,
            });
        }
        Ok(object)
    }

    fn resolve(&self, prefix: &str) -> StoreResult<ObjectId> {
        let path = self.find(prefix)?;
        self.id_from_path(&path)
    }

    fn contains(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_types::Compression;
    use proptest::prelude::*;

    fn make_store(dir: &Path) -> LooseObjectStore {
        LooseObjectStore::new(&RepoLayout::new(dir), StoreConfig::default())
    }

    #[test]
    fn hello_world_lands_in_its_shard() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());

        let (id, path) = store.write_object(ObjectKind::Blob, b"Hello World").unwrap();
        assert_eq!(id.to_hex(), "5e1c309dae7f45e0f39b1bf3ac3cd9db12e7d689");
        assert_eq!(
            path,
            dir.path()
                .join("objects/5e/1c309dae7f45e0f39b1bf3ac3cd9db12e7d689")
        );
        assert!(path.is_file());
    }

    #[test]
    fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());

        let id = store.put(ObjectKind::Tree, b"tree payload").unwrap();
        let obj = store.get(&id).unwrap();
        assert_eq!(obj.kind, ObjectKind::Tree);
        assert_eq!(obj.payload, b"tree payload");
        assert!(store.contains(&id).unwrap());
    }

    #[test]
    fn put_twice_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());

        let (id1, path1) = store.write_object(ObjectKind::Blob, b"same").unwrap();
        let bytes1 = fs::read(&path1).unwrap();
        let (id2, path2) = store.write_object(ObjectKind::Blob, b"same").unwrap();
        assert_eq!(id1, id2);
        assert_eq!(path1, path2);
        assert_eq!(fs::read(&path2).unwrap(), bytes1);

        // A second store writing into a fresh directory produces the same bytes.
        let other = tempfile::tempdir().unwrap();
        let (_, path3) = make_store(other.path())
            .write_object(ObjectKind::Blob, b"same")
            .unwrap();
        assert_eq!(fs::read(path3).unwrap(), bytes1);
    }

    #[test]
    fn stored_file_is_compressed_framing() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let (_, path) = store.write_object(ObjectKind::Blob, b"Hello World").unwrap();
        let framed = decompress(&fs::read(path).unwrap()).unwrap();
        assert_eq!(framed, b"blob 11\0Hello World");
    }

    #[test]
    fn find_with_short_prefix_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        assert!(matches!(
            store.find("a"),
            Err(StoreError::InvalidPrefix { .. })
        ));
    }

    #[test]
    fn find_without_shard_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        assert!(matches!(store.find("ab"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn find_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let (id, path) = store.write_object(ObjectKind::Blob, b"Hello World").unwrap();

        assert_eq!(store.find("5e").unwrap(), path);
        assert_eq!(store.find("5e1c30").unwrap(), path);
        assert_eq!(store.find("5E1C30").unwrap(), path);
        assert_eq!(store.find(&id.to_hex()).unwrap(), path);
        assert!(matches!(store.find("5e1d"), Err(StoreError::NotFound(_))));
        assert_eq!(store.resolve("5e1c").unwrap(), id);
    }

    #[test]
    fn ambiguous_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let shard = dir.path().join("objects/ab");
        fs::create_dir_all(&shard).unwrap();
        fs::write(shard.join("1".repeat(38)), b"x").unwrap();
        fs::write(shard.join("2".repeat(38)), b"y").unwrap();

        assert!(matches!(
            store.find("ab"),
            Err(StoreError::AmbiguousPrefix { matches: 2, .. })
        ));
        assert!(store.find("ab1").is_ok());
    }

    #[test]
    fn stray_files_in_shard_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let (_, path) = store.write_object(ObjectKind::Blob, b"Hello World").unwrap();
        fs::write(dir.path().join("objects/5e/.tmp123"), b"partial").unwrap();
        assert_eq!(store.find("5e").unwrap(), path);
    }

    #[test]
    fn truncated_object_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let payload = b"a payload long enough to be worth truncating".repeat(8);
        let (id, path) = store.write_object(ObjectKind::Blob, &payload).unwrap();

        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

        assert!(matches!(
            store.get(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn lying_header_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let (id, path) = store.write_object(ObjectKind::Blob, b"abc").unwrap();
        let forged = compress(b"blob 4\0abc", &StoreConfig::default()).unwrap();
        fs::write(&path, forged).unwrap();

        assert!(matches!(
            store.get(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn swapped_content_is_hash_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let (id, path) = store.write_object(ObjectKind::Blob, b"original").unwrap();
        let other = compress(b"blob 8\0imposter", &StoreConfig::default()).unwrap();
        fs::write(&path, other).unwrap();

        assert!(matches!(
            store.get(&id),
            Err(StoreError::HashMismatch { .. })
        ));
    }

    #[test]
    fn zstd_and_zlib_objects_coexist() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepoLayout::new(dir.path());
        let zlib = LooseObjectStore::new(&layout, StoreConfig::default());
        let zstd = LooseObjectStore::new(
            &layout,
            StoreConfig {
                compression: Compression::Zstd,
                level: 3,
            },
        );

        let a = zlib.put(ObjectKind::Blob, b"written with zlib").unwrap();
        let b = zstd.put(ObjectKind::Blob, b"written with zstd").unwrap();
        assert_eq!(zstd.get(&a).unwrap().payload, b"written with zlib");
        assert_eq!(zlib.get(&b).unwrap().payload, b"written with zstd");
    }

    #[test]
    fn open_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepoLayout::new(dir.path());
        fs::write(
            layout.config_path(),
            "[store]\ncompression = \"zstd\"\nlevel = 5\n",
        )
        .unwrap();

        let store = LooseObjectStore::open(&layout).unwrap();
        let (_, path) = store.write_object(ObjectKind::Blob, b"configured").unwrap();
        assert!(fs::read(path).unwrap().starts_with(&[0x28, 0xB5, 0x2F, 0xFD]));
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = make_store(dir.path());
        let id = ContentHasher::hash(ObjectKind::Blob, b"never stored");
        assert!(matches!(store.get(&id), Err(StoreError::NotFound(_))));
        assert!(!store.contains(&id).unwrap());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn roundtrip_any_payload(
            payload in proptest::collection::vec(any::<u8>(), 0..2048),
            kind in prop_oneof![
                Just(ObjectKind::Blob),
                Just(ObjectKind::Tree),
                Just(ObjectKind::Commit),
            ],
        ) {
            let dir = tempfile::tempdir().unwrap();
            let store = make_store(dir.path());
            let id = store.put(kind, &payload).unwrap();
            prop_assert_eq!(id, ContentHasher::hash(kind, &payload));
            let obj = store.get(&id).unwrap();
            prop_assert_eq!(obj.kind, kind);
            prop_assert_eq!(obj.payload, payload);
        }
    }
}
