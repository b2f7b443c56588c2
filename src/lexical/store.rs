//! The index store: committed segments, the manifest, and read snapshots.
//!
//! # Commit protocol
//!
//! A batch of documents is analyzed, built into one immutable segment and
//! written to its own file. The batch becomes part of the index only when a
//! new manifest listing that segment atomically replaces the old one
//! (written to a temporary file, then renamed). The in-memory snapshot is
//! swapped after the manifest is durable. A failure at any earlier step
//! leaves both the manifest and the visible snapshot as they were; the
//! unreferenced segment file is removed, or swept up by the next open.
//!
//! # Concurrency
//!
//! Readers clone an `Arc` of the current snapshot under a short read lock
//! and never block each other. Mutations are serialized by a writer mutex
//! and only take the write lock for the pointer swap, so a snapshot opened
//! before a commit keeps seeing exactly what it saw.

use std::collections::HashSet;
use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::Analyzer;
use crate::data::{Document, FieldValue, Schema};
use crate::error::{MarqueeError, Result};
use crate::lexical::segment::{
    AnalyzedDocument, Segment, SegmentBuilder, SegmentMeta, is_segment_file, segment_file_name,
};
use crate::lexical::snapshot::IndexSnapshot;
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};
use crate::util::cancel::{self, CancellationToken};

const MANIFEST_FILE: &str = "segments.json";
const MANIFEST_TMP_FILE: &str = "segments.json.tmp";
const MANIFEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Manifest {
    version: u32,
    generation: u64,
    next_segment_id: u64,
    segments: Vec<SegmentMeta>,
}

impl Manifest {
    fn empty() -> Self {
        Manifest {
            version: MANIFEST_VERSION,
            generation: 0,
            next_segment_id: 0,
            segments: Vec::new(),
        }
    }
}

/// Summary of the committed index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub doc_count: u64,
    pub segment_count: usize,
    /// Distinct terms over all indexed fields.
    pub term_count: usize,
    /// Number of commits since the index was created.
    pub generation: u64,
}

#[derive(Debug)]
struct WriterState {
    next_segment_id: u64,
}

/// Owns the inverted index and stored fields of one index location.
#[derive(Debug)]
pub struct IndexStore {
    storage: Arc<dyn Storage>,
    schema: Schema,
    analyzer: Arc<dyn Analyzer>,
    current: RwLock<Arc<IndexSnapshot>>,
    writer: Mutex<WriterState>,
}

impl IndexStore {
    /// Open the index in `storage`, creating an empty one if none exists.
    ///
    /// Fails with [`MarqueeError::StorageUnavailable`] when the manifest or
    /// any segment it lists is missing or corrupt.
    pub fn open(
        storage: Arc<dyn Storage>,
        schema: Schema,
        analyzer: Arc<dyn Analyzer>,
    ) -> Result<Self> {
        let manifest = if storage.file_exists(MANIFEST_FILE) {
            read_manifest(storage.as_ref())?
        } else {
            let manifest = Manifest::empty();
            write_manifest(storage.as_ref(), &manifest)?;
            manifest
        };

        let segments = manifest
            .segments
            .iter()
            .map(|meta| Segment::read(storage.as_ref(), meta).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;

        let live: HashSet<String> = manifest.segments.iter().map(|m| m.file_name()).collect();
        for name in storage.list_files()? {
            let orphan =
                (is_segment_file(&name) && !live.contains(&name)) || name == MANIFEST_TMP_FILE;
            if orphan {
                warn!("removing orphaned index file {name}");
                remove_file_best_effort(storage.as_ref(), &name);
            }
        }

        let snapshot = IndexSnapshot::new(manifest.generation, segments);
        info!(
            "opened index at generation {} with {} documents in {} segments",
            snapshot.generation(),
            snapshot.doc_count(),
            snapshot.segment_count()
        );

        Ok(IndexStore {
            storage,
            schema,
            analyzer,
            current: RwLock::new(Arc::new(snapshot)),
            writer: Mutex::new(WriterState {
                next_segment_id: manifest.next_segment_id,
            }),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn analyzer(&self) -> &Arc<dyn Analyzer> {
        &self.analyzer
    }

    /// The index as of the last commit. Later commits do not affect it.
    pub fn open_read_snapshot(&self) -> Arc<IndexSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Append `docs` as one atomic batch. Returns the number added.
    pub fn add_documents(&self, docs: Vec<Document>) -> Result<usize> {
        self.add_documents_with_cancel(docs, None)
    }

    /// Like [`IndexStore::add_documents`], aborting with
    /// [`MarqueeError::Cancelled`] if `cancel` fires before the commit.
    pub fn add_documents_with_cancel(
        &self,
        docs: Vec<Document>,
        cancel: Option<&CancellationToken>,
    ) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let mut writer = self.writer.lock();
        cancel::check(cancel)?;

        let count = docs.len();
        let analyzed = docs
            .into_par_iter()
            .map(|doc| -> Result<AnalyzedDocument> {
                cancel::check(cancel)?;
                Ok(self.analyze(doc))
            })
            .collect::<Result<Vec<_>>>()?;

        let segment_id = writer.next_segment_id;
        let mut builder = SegmentBuilder::new(segment_id);
        for doc in analyzed {
            builder.add(doc);
        }
        let segment = builder.build();
        cancel::check(cancel)?;

        let current = self.open_read_snapshot();
        let mut segments: Vec<Arc<Segment>> =
            current.segments().map(|(_, s)| Arc::clone(s)).collect();
        segments.push(Arc::clone(&segment));
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            generation: current.generation() + 1,
            next_segment_id: segment_id + 1,
            segments: segments.iter().map(|s| s.meta()).collect(),
        };

        let committed = segment
            .write(self.storage.as_ref())
            .and_then(|_| cancel::check(cancel))
            .and_then(|_| write_manifest(self.storage.as_ref(), &manifest));
        if let Err(err) = committed {
            remove_file_best_effort(self.storage.as_ref(), &segment_file_name(segment_id));
            return Err(err);
        }

        writer.next_segment_id = segment_id + 1;
        *self.current.write() = Arc::new(IndexSnapshot::new(manifest.generation, segments));
        info!(
            "committed {count} documents as segment {segment_id} (generation {})",
            manifest.generation
        );
        Ok(count)
    }

    /// Remove every document.
    ///
    /// The empty index is published atomically; old segment files are
    /// removed afterwards. Open snapshots keep their documents.
    pub fn delete_all(&self) -> Result<()> {
        let writer = self.writer.lock();
        let current = self.open_read_snapshot();
        let manifest = Manifest {
            version: MANIFEST_VERSION,
            generation: current.generation() + 1,
            next_segment_id: writer.next_segment_id,
            segments: Vec::new(),
        };
        write_manifest(self.storage.as_ref(), &manifest)?;
        *self.current.write() = Arc::new(IndexSnapshot::empty(manifest.generation));

        for (_, segment) in current.segments() {
            remove_file_best_effort(self.storage.as_ref(), &segment.meta().file_name());
        }
        info!(
            "cleared {} documents (generation {})",
            current.doc_count(),
            manifest.generation
        );
        Ok(())
    }

    pub fn stats(&self) -> IndexStats {
        let snapshot = self.open_read_snapshot();
        IndexStats {
            doc_count: u64::from(snapshot.doc_count()),
            segment_count: snapshot.segment_count(),
            term_count: snapshot.term_count(),
            generation: snapshot.generation(),
        }
    }

    /// Split a document into stored values and analyzed indexed fields.
    ///
    /// Non-finite doubles are stored as `0.0`; they have no representation
    /// in the stored-document encoding.
    fn analyze(&self, doc: Document) -> AnalyzedDocument {
        let mut analyzed = AnalyzedDocument::default();
        for (name, value) in doc.fields {
            let value = match value {
                FieldValue::Double(d) if !d.is_finite() => {
                    debug!("field {name}: non-finite value {d} stored as 0");
                    FieldValue::Double(0.0)
                }
                other => other,
            };
            let option = self.schema.option(&name);
            if option.indexed {
                if let Some(text) = value.as_text() {
                    let tokens = self
                        .analyzer
                        .analyze(text)
                        .map(|token| (token.text, token.position))
                        .collect();
                    analyzed.indexed.push((name.clone(), tokens));
                }
            }
            if option.stored {
                analyzed.stored.fields.insert(name, value);
            }
        }
        analyzed
    }
}

fn read_manifest(storage: &dyn Storage) -> Result<Manifest> {
    let mut reader = StructReader::new(storage.open_input(MANIFEST_FILE)?)
        .map_err(|e| MarqueeError::storage(format!("{MANIFEST_FILE}: {e}")))?;
    let json = reader.read_bytes()?;
    let manifest: Manifest = serde_json::from_slice(&json)
        .map_err(|e| MarqueeError::storage(format!("failed to deserialize manifest: {e}")))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(MarqueeError::storage(format!(
            "unsupported manifest version {}",
            manifest.version
        )));
    }
    Ok(manifest)
}

/// Write the manifest to a temporary file, then rename it into place.
fn write_manifest(storage: &dyn Storage, manifest: &Manifest) -> Result<()> {
    let result = publish_manifest(storage, manifest);
    if result.is_err() && storage.file_exists(MANIFEST_TMP_FILE) {
        remove_file_best_effort(storage, MANIFEST_TMP_FILE);
    }
    result
}

fn publish_manifest(storage: &dyn Storage, manifest: &Manifest) -> Result<()> {
    let json = serde_json::to_vec(manifest)?;
    let mut writer = StructWriter::new(storage.create_output(MANIFEST_TMP_FILE)?);
    writer.write_bytes(&json)?;
    writer.close()?;
    storage.rename_file(MANIFEST_TMP_FILE, MANIFEST_FILE)?;
    debug!(
        "published manifest generation {} with {} segments",
        manifest.generation,
        manifest.segments.len()
    );
    Ok(())
}

fn remove_file_best_effort(storage: &dyn Storage, name: &str) {
    if let Err(err) = storage.delete_file(name) {
        warn!("failed to remove index file {name}: {err}");
    }
}
