//! Immutable index segments.
//!
//! Every committed batch of documents becomes one [`Segment`]: the stored
//! field values of its documents plus an inverted index for each indexed
//! field. Segments are never modified after they are built.
//!
//! On-disk layout (all through [`StructWriter`], so the file ends with a
//! CRC32 footer):
//!
//! ```text
//! [u32 magic "MRQS"][u8 version][u64 segment id][varint doc count]
//! doc count × [bytes: JSON stored document]
//! [varint field count]
//! field count × [string name]
//!               doc count × [varint field length]
//!               [varint term count]
//!               term count × [string term][varint posting count]
//!                            posting count × [varint doc delta][varint freq]
//!                                            freq × [varint position delta]
//! ```

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::data::Document;
use crate::error::{MarqueeError, Result};
use crate::lexical::posting::{FieldPostings, FieldPostingsBuilder, Posting, PostingList};
use crate::storage::Storage;
use crate::storage::structured::{StructReader, StructWriter};

const SEGMENT_MAGIC: u32 = u32::from_le_bytes(*b"MRQS");
const SEGMENT_VERSION: u8 = 1;

/// File name prefix and suffix of segment files.
pub(crate) const SEGMENT_PREFIX: &str = "segment_";
pub(crate) const SEGMENT_SUFFIX: &str = ".seg";

/// Manifest entry describing a committed segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMeta {
    pub id: u64,
    pub doc_count: u32,
}

impl SegmentMeta {
    pub fn file_name(&self) -> String {
        segment_file_name(self.id)
    }
}

pub(crate) fn segment_file_name(id: u64) -> String {
    format!("{SEGMENT_PREFIX}{id:06}{SEGMENT_SUFFIX}")
}

pub(crate) fn is_segment_file(name: &str) -> bool {
    name.starts_with(SEGMENT_PREFIX) && name.ends_with(SEGMENT_SUFFIX)
}

/// A document after analysis, ready to be added to a segment.
#[derive(Debug, Clone, Default)]
pub struct AnalyzedDocument {
    /// Stored field values.
    pub stored: Document,
    /// `(field, [(term, position)])` for every indexed field.
    pub indexed: Vec<(String, Vec<(String, u32)>)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    id: u64,
    docs: Vec<Document>,
    fields: AHashMap<String, FieldPostings>,
}

impl Segment {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn doc_count(&self) -> u32 {
        self.docs.len() as u32
    }

    pub fn meta(&self) -> SegmentMeta {
        SegmentMeta {
            id: self.id,
            doc_count: self.doc_count(),
        }
    }

    /// Stored fields of a segment-local document.
    pub fn document(&self, doc: u32) -> Option<&Document> {
        self.docs.get(doc as usize)
    }

    pub fn field(&self, name: &str) -> Option<&FieldPostings> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldPostings)> {
        self.fields.iter().map(|(name, f)| (name.as_str(), f))
    }

    /// Documents in `field` containing `term`.
    pub fn doc_freq(&self, field: &str, term: &str) -> u32 {
        self.field(field)
            .and_then(|f| f.postings(term))
            .map_or(0, PostingList::doc_freq)
    }

    /// Encode the segment into its file.
    pub fn write(&self, storage: &dyn Storage) -> Result<SegmentMeta> {
        let meta = self.meta();
        let mut writer = StructWriter::new(storage.create_output(&meta.file_name())?);

        writer.write_u32(SEGMENT_MAGIC)?;
        writer.write_u8(SEGMENT_VERSION)?;
        writer.write_u64(self.id)?;
        writer.write_varint(u64::from(meta.doc_count))?;
        for doc in &self.docs {
            writer.write_bytes(&serde_json::to_vec(doc)?)?;
        }

        let mut fields: Vec<(&String, &FieldPostings)> = self.fields.iter().collect();
        fields.sort_by(|a, b| a.0.cmp(b.0));
        writer.write_varint(fields.len() as u64)?;
        for (name, field) in fields {
            writer.write_string(name)?;
            for length in &field.lengths {
                writer.write_varint(u64::from(*length))?;
            }

            let mut terms: Vec<(&String, &PostingList)> = field.terms.iter().collect();
            terms.sort_by(|a, b| a.0.cmp(b.0));
            writer.write_varint(terms.len() as u64)?;
            for (term, list) in terms {
                writer.write_string(term)?;
                writer.write_varint(list.postings().len() as u64)?;
                let mut last_doc = 0u32;
                for posting in list.postings() {
                    writer.write_varint(u64::from(posting.doc - last_doc))?;
                    last_doc = posting.doc;
                    writer.write_varint(u64::from(posting.freq()))?;
                    let mut last_pos = 0u32;
                    for &pos in &posting.positions {
                        writer.write_varint(u64::from(pos - last_pos))?;
                        last_pos = pos;
                    }
                }
            }
        }

        writer.close()?;
        Ok(meta)
    }

    /// Load and verify the segment described by `meta`.
    pub fn read(storage: &dyn Storage, meta: &SegmentMeta) -> Result<Segment> {
        let file_name = meta.file_name();
        let corrupt = |what: &str| MarqueeError::storage(format!("{file_name}: {what}"));

        let mut reader = StructReader::new(storage.open_input(&file_name)?)
            .map_err(|e| corrupt(&e.to_string()))?;

        if reader.read_u32()? != SEGMENT_MAGIC {
            return Err(corrupt("not a segment file"));
        }
        let version = reader.read_u8()?;
        if version != SEGMENT_VERSION {
            return Err(corrupt(&format!("unsupported version {version}")));
        }
        let id = reader.read_u64()?;
        let doc_count = read_u32_varint(&mut reader)?;
        if id != meta.id || doc_count != meta.doc_count {
            return Err(corrupt("header does not match manifest"));
        }

        let mut docs = Vec::with_capacity(doc_count as usize);
        for _ in 0..doc_count {
            let json = reader.read_bytes()?;
            let doc: Document = serde_json::from_slice(&json)
                .map_err(|e| corrupt(&format!("bad stored document: {e}")))?;
            docs.push(doc);
        }

        let field_count = reader.read_varint()?;
        let mut fields = AHashMap::new();
        for _ in 0..field_count {
            let name = reader.read_string()?;
            let mut lengths = Vec::with_capacity(doc_count as usize);
            for _ in 0..doc_count {
                lengths.push(read_u32_varint(&mut reader)?);
            }

            let term_count = reader.read_varint()?;
            let mut terms = AHashMap::new();
            for _ in 0..term_count {
                let term = reader.read_string()?;
                let posting_count = reader.read_varint()?;
                let mut postings = Vec::new();
                let mut doc = 0u32;
                for i in 0..posting_count {
                    let delta = read_u32_varint(&mut reader)?;
                    if i > 0 && delta == 0 {
                        return Err(corrupt("postings out of order"));
                    }
                    doc = doc
                        .checked_add(delta)
                        .filter(|d| *d < doc_count)
                        .ok_or_else(|| corrupt("posting refers to unknown document"))?;
                    let freq = read_u32_varint(&mut reader)?;
                    let mut positions = Vec::with_capacity(freq as usize);
                    let mut pos = 0u32;
                    for _ in 0..freq {
                        pos = pos
                            .checked_add(read_u32_varint(&mut reader)?)
                            .ok_or_else(|| corrupt("position overflow"))?;
                        positions.push(pos);
                    }
                    postings.push(Posting { doc, positions });
                }
                terms.insert(term, PostingList::new(postings));
            }
            fields.insert(name, FieldPostings { terms, lengths });
        }

        if reader.remaining() != 0 {
            return Err(corrupt("trailing bytes"));
        }

        Ok(Segment { id, docs, fields })
    }
}

fn read_u32_varint(reader: &mut StructReader) -> Result<u32> {
    u32::try_from(reader.read_varint()?)
        .map_err(|_| MarqueeError::storage("value out of range for u32"))
}

/// Builds a [`Segment`] from analyzed documents in insertion order.
#[derive(Debug)]
pub struct SegmentBuilder {
    id: u64,
    docs: Vec<Document>,
    fields: AHashMap<String, FieldPostingsBuilder>,
}

impl SegmentBuilder {
    pub fn new(id: u64) -> Self {
        SegmentBuilder {
            id,
            docs: Vec::new(),
            fields: AHashMap::new(),
        }
    }

    pub fn add(&mut self, doc: AnalyzedDocument) {
        let local = self.docs.len() as u32;
        for (field, tokens) in &doc.indexed {
            self.fields
                .entry(field.clone())
                .or_default()
                .add_document(local, tokens);
        }
        self.docs.push(doc.stored);
    }

    pub fn build(self) -> Arc<Segment> {
        let doc_count = self.docs.len() as u32;
        Arc::new(Segment {
            id: self.id,
            docs: self.docs,
            fields: self
                .fields
                .into_iter()
                .map(|(name, builder)| (name, builder.build(doc_count)))
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStorage;
    use std::io::{Read, Write};

    fn analyzed(title: &str) -> AnalyzedDocument {
        let tokens = title
            .split_whitespace()
            .enumerate()
            .map(|(i, t)| (t.to_lowercase(), i as u32))
            .collect();
        AnalyzedDocument {
            stored: Document::new().with_field("title", title),
            indexed: vec![("body".to_string(), tokens)],
        }
    }

    fn sample() -> Arc<Segment> {
        let mut builder = SegmentBuilder::new(3);
        builder.add(analyzed("Dune"));
        builder.add(analyzed("Dune Part Two"));
        builder.add(analyzed("Part of the dune dune"));
        builder.build()
    }

    #[test]
    fn test_builder() {
        let segment = sample();
        assert_eq!(segment.doc_count(), 3);
        assert_eq!(segment.doc_freq("body", "dune"), 3);
        assert_eq!(segment.doc_freq("body", "two"), 1);
        assert_eq!(segment.doc_freq("title", "dune"), 0);
        assert_eq!(segment.document(1).unwrap().text("title"), "Dune Part Two");
        let body = segment.field("body").unwrap();
        assert_eq!(body.field_length(2), 5);
        assert_eq!(
            body.postings("dune").unwrap().get(2).unwrap().positions,
            vec![3, 4]
        );
    }

    #[test]
    fn test_write_then_read() {
        let storage = MemoryStorage::default();
        let segment = sample();
        let meta = segment.write(&storage).unwrap();
        assert_eq!(meta.file_name(), "segment_000003.seg");
        assert!(is_segment_file(&meta.file_name()));

        let loaded = Segment::read(&storage, &meta).unwrap();
        assert_eq!(&loaded, segment.as_ref());
    }

    #[test]
    fn test_read_rejects_mismatched_manifest() {
        let storage = MemoryStorage::default();
        let meta = sample().write(&storage).unwrap();
        let wrong = SegmentMeta {
            doc_count: 9,
            ..meta
        };
        assert!(Segment::read(&storage, &wrong).unwrap_err().is_storage());
    }

    #[test]
    fn test_read_rejects_flipped_byte() {
        let storage = MemoryStorage::default();
        let meta = sample().write(&storage).unwrap();

        let mut data = Vec::new();
        storage
            .open_input(&meta.file_name())
            .unwrap()
            .read_to_end(&mut data)
            .unwrap();
        let mid = data.len() / 2;
        data[mid] ^= 0x55;
        let mut out = storage.create_output(&meta.file_name()).unwrap();
        out.write_all(&data).unwrap();
        out.close().unwrap();

        assert!(Segment::read(&storage, &meta).unwrap_err().is_storage());
    }
}
