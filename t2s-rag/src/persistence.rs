//! Versioned on-disk format for [`LexicalIndex`].
//!
//! The index is stored as a JSON document:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "config": { ... },
//!   "vectorizer": { "config": { ... }, "vocabulary": { "term": 0 }, "idf": [ ... ] },
//!   "vectors": [[ ... ]],
//!   "metadata": [{ ... }],
//!   "fitted": true
//! }
//! ```
//!
//! The version is checked before the rest of the document is decoded, so a
//! blob from another format version fails with
//! [`RagError::IncompatibleFormat`] rather than a field-level decode error.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, IntoInnerError, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::IndexConfig;
use crate::document::Metadata;
use crate::error::{RagError, Result};
use crate::index::LexicalIndex;
use crate::vectorizer::TfidfVectorizer;

/// Current persisted format version.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SnapshotRef<'a> {
    format_version: u32,
    config: &'a IndexConfig,
    vectorizer: Option<&'a TfidfVectorizer>,
    vectors: &'a [Vec<f64>],
    metadata: &'a [Metadata],
    fitted: bool,
}

#[derive(Deserialize)]
struct Snapshot {
    config: IndexConfig,
    vectorizer: Option<TfidfVectorizer>,
    vectors: Vec<Vec<f64>>,
    metadata: Vec<Metadata>,
    fitted: bool,
}

impl LexicalIndex {
    /// Write the full index state to `path`, replacing any existing file.
    ///
    /// The state is written to a sibling `<name>.tmp` file first and renamed
    /// over `path` once complete; a failed save leaves `path` untouched.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Io`] or [`RagError::Serialization`] on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let staging = staging_path(path);
        let written = self.write_synced(&staging).and_then(|()| Ok(fs::rename(&staging, path)?));
        if let Err(err) = written {
            fs::remove_file(&staging).ok();
            return Err(err);
        }
        info!(path = %path.display(), documents = self.len(), "saved index");
        Ok(())
    }

    fn write_synced(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.save_to_writer(&mut writer)?;
        let file = writer.into_inner().map_err(IntoInnerError::into_error)?;
        file.sync_all()?;
        Ok(())
    }

    /// Serialize the full index state into `writer`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Serialization`] if encoding or writing fails.
    pub fn save_to_writer<W: Write>(&self, writer: W) -> Result<()> {
        let snapshot = SnapshotRef {
            format_version: FORMAT_VERSION,
            config: &self.config,
            vectorizer: self.vectorizer.as_ref(),
            vectors: &self.vectors,
            metadata: &self.metadata,
            fitted: self.is_fitted(),
        };
        serde_json::to_writer(writer, &snapshot)?;
        Ok(())
    }

    /// Read an index previously written by [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// - [`RagError::Io`] if the file cannot be read
    /// - [`RagError::Serialization`] if the file is not a valid index document
    /// - [`RagError::IncompatibleFormat`] for another format version or
    ///   internally inconsistent state
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let index = Self::load_from_reader(BufReader::new(File::open(path)?))?;
        info!(path = %path.display(), documents = index.len(), "loaded index");
        Ok(index)
    }

    /// Deserialize an index from `reader`.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus file access.
    pub fn load_from_reader<R: Read>(reader: R) -> Result<Self> {
        let raw: serde_json::Value = serde_json::from_reader(reader)?;

        let version = raw.get("format_version").and_then(serde_json::Value::as_u64);
        if version != Some(u64::from(FORMAT_VERSION)) {
            return Err(RagError::IncompatibleFormat {
                found: version.map_or_else(|| "no format_version".to_string(), |v| format!("version {v}")),
                expected: format!("version {FORMAT_VERSION}"),
            });
        }

        let snapshot: Snapshot = serde_json::from_value(raw)?;
        validate(&snapshot)?;

        Ok(LexicalIndex {
            config: snapshot.config,
            vectorizer: snapshot.vectorizer,
            vectors: snapshot.vectors,
            metadata: snapshot.metadata,
        })
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|name| name.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn validate(snapshot: &Snapshot) -> Result<()> {
    let inconsistent = |found: String, expected: &str| RagError::IncompatibleFormat {
        found,
        expected: expected.to_string(),
    };

    if snapshot.fitted != snapshot.vectorizer.is_some() {
        return Err(inconsistent(
            format!("fitted = {} with vectorizer present = {}", snapshot.fitted, snapshot.vectorizer.is_some()),
            "fitted flag matching vectorizer presence",
        ));
    }
    if snapshot.vectors.len() != snapshot.metadata.len() {
        return Err(inconsistent(
            format!("{} vectors and {} metadata entries", snapshot.vectors.len(), snapshot.metadata.len()),
            "one metadata entry per vector",
        ));
    }

    match &snapshot.vectorizer {
        Some(vectorizer) => {
            vectorizer.check_consistency()?;
            let dims = vectorizer.dimensions();
            if let Some(bad) = snapshot.vectors.iter().find(|v| v.len() != dims) {
                return Err(inconsistent(
                    format!("vector of length {} for {dims} dimensions", bad.len()),
                    "vectors as long as the vocabulary",
                ));
            }
        }
        None if !snapshot.vectors.is_empty() => {
            return Err(inconsistent(
                format!("{} vectors without a vectorizer", snapshot.vectors.len()),
                "no vectors in an unfitted index",
            ));
        }
        None => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fitted_index() -> LexicalIndex {
        let mut index = LexicalIndex::new();
        index
            .add_documents(
                &["film.title: 电影标题", "film.rental_rate: 租赁费用"],
                vec![
                    Metadata::from([("column_name".to_string(), "title".to_string())]),
                    Metadata::from([("column_name".to_string(), "rental_rate".to_string())]),
                ],
            )
            .unwrap();
        index
    }

    #[test]
    fn writer_round_trip_preserves_state() {
        let index = fitted_index();
        let mut buf = Vec::new();
        index.save_to_writer(&mut buf).unwrap();
        let loaded = LexicalIndex::load_from_reader(buf.as_slice()).unwrap();
        assert_eq!(loaded, index);
    }

    #[test]
    fn unfitted_index_round_trips() {
        let mut buf = Vec::new();
        LexicalIndex::new().save_to_writer(&mut buf).unwrap();
        let loaded = LexicalIndex::load_from_reader(buf.as_slice()).unwrap();
        assert!(!loaded.is_fitted());
        assert!(loaded.search("title", 3).is_empty());
    }

    #[test]
    fn rejects_other_versions() {
        let mut value = serde_json::to_value(SnapshotRef {
            format_version: FORMAT_VERSION,
            config: &IndexConfig::default(),
            vectorizer: None,
            vectors: &[],
            metadata: &[],
            fitted: false,
        })
        .unwrap();
        value["format_version"] = serde_json::json!(FORMAT_VERSION + 1);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = LexicalIndex::load_from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, RagError::IncompatibleFormat { .. }));
    }

    #[test]
    fn rejects_inconsistent_fitted_flag() {
        let index = fitted_index();
        let mut buf = Vec::new();
        index.save_to_writer(&mut buf).unwrap();
        let mut value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        value["fitted"] = serde_json::json!(false);
        let bytes = serde_json::to_vec(&value).unwrap();

        let err = LexicalIndex::load_from_reader(bytes.as_slice()).unwrap_err();
        assert!(matches!(err, RagError::IncompatibleFormat { .. }));
    }

    #[test]
    fn corrupt_blob_is_a_serialization_error() {
        let err = LexicalIndex::load_from_reader(&b"{not json"[..]).unwrap_err();
        assert!(matches!(err, RagError::Serialization(_)));
    }

    #[test]
    fn save_replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        LexicalIndex::new().save(&path).unwrap();

        let index = fitted_index();
        index.save(&path).unwrap();
        assert_eq!(LexicalIndex::load(&path).unwrap(), index);
        assert!(!dir.path().join("index.json.tmp").exists());
    }

    #[test]
    fn failed_save_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        let index = fitted_index();
        index.save(&path).unwrap();

        // a directory in the staging slot makes the next write fail
        fs::create_dir(dir.path().join("index.json.tmp")).unwrap();
        let err = LexicalIndex::new().save(&path).unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
        assert_eq!(LexicalIndex::load(&path).unwrap(), index);
    }
}
