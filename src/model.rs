//! Data model for decomposed documents.
//!
//! This module contains the value types shared by the codecs and drivers:
//! - FASTA records and documents
//! - MSF header lines, alignment blocks and documents
//!
//! Nothing here performs I/O. Documents are built by the parsers in
//! [`crate::formats`], consumed by the drivers in [`crate::split`], and dropped.

/// A single sequence record: identifier plus concatenated residues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    /// The sequence identifier (first token of the FASTA header, without '>')
    pub id: String,
    /// Residues with all line breaks and whitespace removed
    pub residues: String,
}

impl SequenceRecord {
    /// Creates a new record.
    pub fn new(id: impl Into<String>, residues: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            residues: residues.into(),
        }
    }

    /// Returns the number of residues.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Returns true if the record has no residues.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

/// An ordered multi-FASTA document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastaDocument {
    /// Records in order of appearance in the source text
    pub records: Vec<SequenceRecord>,
}

impl FastaDocument {
    pub fn new(records: Vec<SequenceRecord>) -> Self {
        Self { records }
    }

    /// Returns the number of records.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Gets a record by index.
    pub fn get(&self, index: usize) -> Option<&SequenceRecord> {
        self.records.get(index)
    }

    /// Iterates over record identifiers in document order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.id.as_str())
    }
}

/// One line of an MSF header, classified once when the document is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderLine {
    /// A `Name: <id> ...` declaration.
    ///
    /// The pieces concatenate back to the exact source line:
    /// `indent + label + id + rest`, where `label` is `Name:` plus the
    /// whitespace that separated it from the identifier.
    NameDeclaration {
        indent: String,
        label: String,
        id: String,
        rest: String,
    },
    /// Any other header line, kept verbatim.
    Other(String),
}

impl HeaderLine {
    /// Returns the line exactly as it appeared in the source.
    pub fn render(&self) -> String {
        match self {
            HeaderLine::NameDeclaration {
                indent,
                label,
                id,
                rest,
            } => {
                let mut line =
                    String::with_capacity(indent.len() + label.len() + id.len() + rest.len());
                line.push_str(indent);
                line.push_str(label);
                line.push_str(id);
                line.push_str(rest);
                line
            }
            HeaderLine::Other(raw) => raw.clone(),
        }
    }

    /// Returns the declared identifier for `Name:` lines.
    pub fn declared_id(&self) -> Option<&str> {
        match self {
            HeaderLine::NameDeclaration { id, .. } => Some(id.as_str()),
            HeaderLine::Other(_) => None,
        }
    }
}

/// Header section of an MSF document, terminator line included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsfHeader {
    pub lines: Vec<HeaderLine>,
}

impl MsfHeader {
    pub fn new(lines: Vec<HeaderLine>) -> Self {
        Self { lines }
    }

    /// Identifiers declared by `Name:` lines, in header order.
    pub fn declared_ids(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(HeaderLine::declared_id)
    }
}

/// One per-sequence line of an alignment block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLine {
    /// First whitespace-delimited token of the line
    pub id: String,
    /// The full original line, never reconstructed
    pub raw: String,
}

impl SequenceLine {
    pub fn new(id: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw: raw.into(),
        }
    }
}

/// A contiguous group of sequence lines covering one column range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentBlock {
    pub lines: Vec<SequenceLine>,
}

impl AlignmentBlock {
    pub fn new(lines: Vec<SequenceLine>) -> Self {
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Identifiers of this block's lines, in block order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.id.as_str())
    }
}

/// A parsed MSF document: header plus alignment blocks in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MsfDocument {
    pub header: MsfHeader,
    pub blocks: Vec<AlignmentBlock>,
}

impl MsfDocument {
    pub fn new(header: MsfHeader, blocks: Vec<AlignmentBlock>) -> Self {
        Self { header, blocks }
    }

    /// Returns the reference ordering: identifiers of the first block.
    ///
    /// Empty when the document has no blocks, in which case it contributes
    /// no pairs.
    pub fn identifiers(&self) -> Vec<&str> {
        self.blocks
            .first()
            .map(|block| block.ids().collect())
            .unwrap_or_default()
    }

    /// Returns the number of alignment blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }
}
