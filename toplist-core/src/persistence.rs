//! File-backed placement storage.
//!
//! One JSON file per world (`<directory>/<world>_toplists.json`) holds the
//! full list of [`PlacementRecord`]s for that world. Writes replace the
//! whole file atomically (write to a sibling temp file, then rename).
//!
//! Reads favour availability: an unreadable or malformed file is logged
//! and treated as empty, and individual malformed records are skipped.
//! Skipped records stay on disk; rewrites carry them along verbatim.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{Result, ToplistError};
use crate::placement::{PlacementRecord, StoredPlacement};
use crate::types::PlacementId;

/// Handle to the directory that stores per-world placement files.
#[derive(Debug, Clone)]
pub struct PlacementStore {
    directory: PathBuf,
}

impl PlacementStore {
    /// Store rooted at `directory`. The directory is created on first save.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    /// Store configured from `[persistence]`.
    #[must_use]
    pub fn from_config(config: &PersistenceConfig) -> Self {
        Self::new(config.directory.clone())
    }

    /// Root directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the placement file for `world_id`.
    #[must_use]
    pub fn path_for(&self, world_id: &str) -> PathBuf {
        self.directory
            .join(format!("{}_toplists.json", sanitize_world_id(world_id)))
    }

    /// Load every valid placement for `world_id`.
    ///
    /// Missing files, malformed files and malformed records never fail the
    /// load; they are logged and contribute nothing.
    #[must_use]
    pub fn load(&self, world_id: &str) -> Vec<PlacementRecord> {
        self.read_file(world_id).records
    }

    /// Like [`PlacementStore::load`], but writes the file back when some
    /// records had no stored ID, so the IDs assigned now stay stable.
    ///
    /// Records that failed to parse are written back unchanged. A malformed
    /// file is never rewritten. A failed write-back is logged; the loaded
    /// records are still returned.
    #[must_use]
    pub fn load_and_migrate(&self, world_id: &str) -> Vec<PlacementRecord> {
        let file = self.read_file(world_id);
        if file.missing_ids > 0 {
            info!(
                world = %world_id,
                missing_ids = file.missing_ids,
                kept_unparsed = file.unparsed.len(),
                "Assigning IDs to legacy placements"
            );
            if let Err(e) = self.write_file(world_id, &file.records, &file.unparsed) {
                warn!(world = %world_id, error = %e, "Failed to write back migrated placements");
            }
        }
        file.records
    }

    fn read_file(&self, world_id: &str) -> StoredFile {
        let path = self.path_for(world_id);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(world = %world_id, "No placement file yet");
                return StoredFile::default();
            }
            Err(e) => {
                warn!(world = %world_id, path = %path.display(), error = %e, "Failed to read placement file");
                return StoredFile::unreadable();
            }
        };

        let raw: Vec<serde_json::Value> = match serde_json::from_str(&content) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(world = %world_id, path = %path.display(), error = %e, "Malformed placement file, ignoring");
                return StoredFile::unreadable();
            }
        };

        let total = raw.len();
        let mut file = StoredFile::default();
        for (index, value) in raw.into_iter().enumerate() {
            let parsed = serde_json::from_value::<StoredPlacement>(value.clone())
                .map_err(|e| ToplistError::Serialization(e.to_string()))
                .and_then(|stored| {
                    let had_id = stored.id.is_some();
                    PlacementRecord::try_from(stored).map(|record| (record, had_id))
                });
            match parsed {
                Ok((record, had_id)) => {
                    if !had_id {
                        file.missing_ids += 1;
                    }
                    file.records.push(record);
                }
                Err(e) => {
                    warn!(world = %world_id, index, error = %e, "Skipping malformed placement record");
                    file.unparsed.push(value);
                }
            }
        }

        debug!(world = %world_id, loaded = file.records.len(), total, "Loaded placements");
        file
    }

    /// Replace the full record set for `world_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ToplistError::Io`] if the directory or file cannot be
    /// written, or [`ToplistError::Serialization`] if encoding fails.
    pub fn save(&self, world_id: &str, records: &[PlacementRecord]) -> Result<()> {
        self.write_file(world_id, records, &[])
    }

    fn write_file(
        &self,
        world_id: &str,
        records: &[PlacementRecord],
        unparsed: &[serde_json::Value],
    ) -> Result<()> {
        fs::create_dir_all(&self.directory)?;

        let mut entries = Vec::with_capacity(records.len() + unparsed.len());
        for record in records {
            let value = serde_json::to_value(StoredPlacement::from(record))
                .map_err(|e| ToplistError::Serialization(e.to_string()))?;
            entries.push(value);
        }
        entries.extend_from_slice(unparsed);
        let json = serde_json::to_vec_pretty(&entries)
            .map_err(|e| ToplistError::Serialization(e.to_string()))?;

        let path = self.path_for(world_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &path)?;

        debug!(
            world = %world_id,
            records = records.len(),
            unparsed = unparsed.len(),
            bytes = json.len(),
            "Saved placements"
        );
        Ok(())
    }

    /// Load, append `record`, save. Records that fail to parse are kept.
    ///
    /// # Errors
    ///
    /// Returns [`ToplistError::Serialization`] without writing if the
    /// existing file is unreadable or malformed, and propagates write
    /// failures.
    pub fn append(&self, world_id: &str, record: PlacementRecord) -> Result<()> {
        let mut file = self.read_file(world_id);
        file.ensure_writable(world_id)?;
        info!(world = %world_id, placement = %record.id, location = %record.location, "Persisting placement");
        file.records.push(record);
        self.write_file(world_id, &file.records, &file.unparsed)
    }

    /// Load, drop every record matching `predicate`, save.
    ///
    /// Returns the number of records removed. Nothing is written when no
    /// record matched. Records that fail to parse are kept.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn remove_matching<F>(&self, world_id: &str, mut predicate: F) -> Result<usize>
    where
        F: FnMut(&PlacementRecord) -> bool,
    {
        let mut file = self.read_file(world_id);
        let before = file.records.len();
        file.records.retain(|r| !predicate(r));
        let removed = before - file.records.len();

        if removed > 0 {
            self.write_file(world_id, &file.records, &file.unparsed)?;
        }
        Ok(removed)
    }

    /// Remove the record with the given stable ID.
    ///
    /// Returns `true` if a record was removed.
    ///
    /// # Errors
    ///
    /// Propagates write failures.
    pub fn remove(&self, world_id: &str, id: PlacementId) -> Result<bool> {
        Ok(self.remove_matching(world_id, |r| r.id == id)? > 0)
    }
}

/// Contents of one placement file as read from disk.
#[derive(Debug, Default)]
struct StoredFile {
    records: Vec<PlacementRecord>,
    /// Entries that failed to parse, kept verbatim for the next write.
    unparsed: Vec<serde_json::Value>,
    missing_ids: usize,
    /// The file exists but could not be read as a JSON array.
    unreadable: bool,
}

impl StoredFile {
    fn unreadable() -> Self {
        Self {
            unreadable: true,
            ..Self::default()
        }
    }

    fn ensure_writable(&self, world_id: &str) -> Result<()> {
        if self.unreadable {
            return Err(ToplistError::Serialization(format!(
                "placement file for world '{world_id}' is unreadable, refusing to overwrite"
            )));
        }
        Ok(())
    }
}

/// Make a world identifier safe to embed in a file name.
///
/// `[A-Za-z0-9_.-]` pass through and every other byte becomes `%XX`, so
/// distinct world ids never share a file. A leading `.` is escaped too.
fn sanitize_world_id(world_id: &str) -> String {
    let mut out = String::with_capacity(world_id.len());
    for (i, byte) in world_id.bytes().enumerate() {
        let literal = byte.is_ascii_alphanumeric()
            || matches!(byte, b'_' | b'-')
            || (byte == b'.' && i > 0);
        if literal {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Angles, Transform, Vec3};

    fn record(x: f32) -> PlacementRecord {
        PlacementRecord::new(Transform {
            location: Vec3::new(x, 2.0, 3.0),
            orientation: Angles::new(0.0, 90.0, 0.0),
        })
    }

    #[test]
    fn load_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        assert!(store.load("de_dust2").is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path().join("nested"));
        let records = vec![record(1.0), record(-250.75)];

        store.save("de_dust2", &records).expect("save");
        assert_eq!(store.load("de_dust2"), records);
        assert!(!store.path_for("de_dust2").with_extension("json.tmp").exists());
    }

    #[test]
    fn append_and_remove_by_id() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        let a = record(1.0);
        let b = record(2.0);

        store.append("de_mirage", a.clone()).expect("append a");
        store.append("de_mirage", b.clone()).expect("append b");
        assert_eq!(store.load("de_mirage").len(), 2);

        assert!(store.remove("de_mirage", a.id).expect("remove"));
        assert!(!store.remove("de_mirage", a.id).expect("remove again"));
        assert_eq!(store.load("de_mirage"), vec![b]);
    }

    #[test]
    fn worlds_are_isolated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        store.append("de_inferno", record(1.0)).expect("append");
        assert!(store.load("de_nuke").is_empty());
    }

    #[test]
    fn malformed_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(store.path_for("de_dust2"), "{ not json ]").expect("write");
        assert!(store.load("de_dust2").is_empty());
    }

    #[test]
    fn malformed_records_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(
            store.path_for("de_dust2"),
            r#"[
                {"Location":"1 2 3","Rotation":"0 0 0"},
                {"Location":"1 2","Rotation":"0 0 0"},
                {"location":"4 5 6"},
                {"location":"7 8 9","rotation":"0 45 0"}
            ]"#,
        )
        .expect("write");

        let loaded = store.load("de_dust2");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].location, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(loaded[1].rotation, Angles::new(0.0, 45.0, 0.0));
    }

    #[test]
    fn migration_pins_generated_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(
            store.path_for("de_ancient"),
            r#"[{"Location":"10 20 30","Rotation":"0 180 0"}]"#,
        )
        .expect("write");

        let migrated = store.load_and_migrate("de_ancient");
        assert_eq!(migrated.len(), 1);
        assert_eq!(store.load("de_ancient")[0].id, migrated[0].id);
        assert!(store.remove("de_ancient", migrated[0].id).expect("remove"));
    }

    #[test]
    fn remove_matching_without_hits_leaves_file_alone() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        assert_eq!(store.remove_matching("de_vertigo", |_| true).expect("remove"), 0);
        assert!(!store.path_for("de_vertigo").exists());
    }

    #[test]
    fn world_ids_are_sanitized() {
        assert_eq!(sanitize_world_id("de_dust2"), "de_dust2");
        assert_eq!(sanitize_world_id("cs_office.v2"), "cs_office.v2");
        assert_eq!(sanitize_world_id("../../etc/passwd"), "%2E.%2F..%2Fetc%2Fpasswd");
        assert_eq!(sanitize_world_id("workshop/123/aim map"), "workshop%2F123%2Faim%20map");
    }

    #[test]
    fn distinct_world_ids_get_distinct_files() {
        let store = PlacementStore::new("placements");
        assert_ne!(store.path_for("a/b"), store.path_for("a_b"));
        assert_ne!(store.path_for("a b"), store.path_for("a%20b"));
        assert_ne!(store.path_for(".hidden"), store.path_for("hidden"));
        assert_eq!(
            store.path_for("de_dust2"),
            Path::new("placements").join("de_dust2_toplists.json")
        );
    }

    const LEGACY_WITH_BAD_RECORD: &str = r#"[
        {"Location":"10.00 20.00 30.00","Rotation":"0.00 90.00 0.00"},
        {"Location":"1,234.56 -340.50 64.00","Rotation":"0.00 0.00 0.00"}
    ]"#;

    #[test]
    fn migration_keeps_records_it_cannot_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(store.path_for("de_dust2"), LEGACY_WITH_BAD_RECORD).expect("write");

        let migrated = store.load_and_migrate("de_dust2");
        assert_eq!(migrated.len(), 1);

        let on_disk = fs::read_to_string(store.path_for("de_dust2")).expect("read");
        assert!(on_disk.contains("1,234.56"));
        // The parsed record got its ID pinned.
        assert_eq!(store.load("de_dust2")[0].id, migrated[0].id);
    }

    #[test]
    fn append_and_remove_keep_unparsed_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(store.path_for("de_dust2"), LEGACY_WITH_BAD_RECORD).expect("write");

        let added = record(5.0);
        store.append("de_dust2", added.clone()).expect("append");
        assert_eq!(store.load("de_dust2").len(), 2);
        assert!(store.remove("de_dust2", added.id).expect("remove"));

        let on_disk = fs::read_to_string(store.path_for("de_dust2")).expect("read");
        assert!(on_disk.contains("1,234.56"));
        assert_eq!(store.load("de_dust2").len(), 1);
    }

    #[test]
    fn append_refuses_to_overwrite_malformed_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = PlacementStore::new(dir.path());
        fs::write(store.path_for("de_dust2"), "{ not json ]").expect("write");

        assert!(store.append("de_dust2", record(1.0)).is_err());
        let on_disk = fs::read_to_string(store.path_for("de_dust2")).expect("read");
        assert_eq!(on_disk, "{ not json ]");
    }
}
