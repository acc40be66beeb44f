//! FASTA codec.
//!
//! Reads multi-FASTA text into a [`FastaDocument`] and writes records back
//! as wrapped FASTA text.
//!
//! ## FASTA Format
//!
//! ```text
//! >sequence_identifier optional description
//! ACGTACGTACGT...
//! >another_sequence
//! TGCATGCATGCA...
//! ```
//!
//! Only the first token of a header survives parsing; the description is
//! not modeled.

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

use crate::model::{FastaDocument, SequenceRecord};

/// Default residues per output line.
pub const DEFAULT_LINE_WIDTH: usize = 60;

/// Errors that can occur during FASTA parsing.
#[derive(Error, Debug)]
pub enum FastaError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Sequence without header at line {0}")]
    SequenceWithoutHeader(usize),

    #[error("Empty sequence identifier at line {0}")]
    EmptyIdentifier(usize),

    #[error("Duplicate sequence identifier '{id}' at line {line}")]
    DuplicateIdentifier { id: String, line: usize },
}

/// Result type for FASTA operations.
pub type FastaResult<T> = Result<T, FastaError>;

/// Parses a FASTA file into a document.
///
/// The whole file is read into memory before parsing.
///
/// # Examples
///
/// ```no_run
/// use alnsplit::formats::fasta::parse_fasta_file;
///
/// let doc = parse_fasta_file("BB11001.tfa").unwrap();
/// println!("Loaded {} records", doc.record_count());
/// ```
pub fn parse_fasta_file<P: AsRef<Path>>(path: P) -> FastaResult<FastaDocument> {
    let content = super::read_to_string(path)?;
    parse_fasta_str(&content)
}

/// Parses FASTA content from a string.
///
/// Text with no header lines and no sequence data yields an empty document.
pub fn parse_fasta_str(content: &str) -> FastaResult<FastaDocument> {
    let mut records = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    let mut current_id: Option<&str> = None;
    let mut current_seq = String::new();

    for (idx, line) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some(id) = current_id.take() {
                records.push(SequenceRecord::new(id, std::mem::take(&mut current_seq)));
            }

            let id = header
                .split_whitespace()
                .next()
                .ok_or(FastaError::EmptyIdentifier(line_number))?;

            if !seen.insert(id) {
                return Err(FastaError::DuplicateIdentifier {
                    id: id.to_string(),
                    line: line_number,
                });
            }

            current_id = Some(id);
        } else {
            if current_id.is_none() {
                return Err(FastaError::SequenceWithoutHeader(line_number));
            }

            // Most lines carry no inner whitespace
            if line.bytes().all(|b| !b.is_ascii_whitespace()) {
                current_seq.push_str(line);
            } else {
                current_seq.extend(line.chars().filter(|c| !c.is_whitespace()));
            }
        }
    }

    if let Some(id) = current_id {
        records.push(SequenceRecord::new(id, current_seq));
    }

    Ok(FastaDocument::new(records))
}

/// Splits `residues` into chunks of at most `width` characters.
///
/// A width of zero is treated as one.
pub fn wrap_residues(residues: &str, width: usize) -> Vec<&str> {
    let width = width.max(1);
    let mut chunks = Vec::with_capacity(residues.len() / width + 1);
    let mut start = 0;
    let mut count = 0;

    for (pos, _) in residues.char_indices() {
        if count == width {
            chunks.push(&residues[start..pos]);
            start = pos;
            count = 0;
        }
        count += 1;
    }
    if start < residues.len() {
        chunks.push(&residues[start..]);
    }
    chunks
}

/// Serializes records to FASTA text, wrapping residues at `line_width`.
///
/// A record without residues is written as its header line only.
pub fn write_fasta<'a, I>(entries: I, line_width: usize) -> String
where
    I: IntoIterator<Item = &'a SequenceRecord>,
{
    let mut out = String::new();
    for record in entries {
        out.push('>');
        out.push_str(&record.id);
        out.push('\n');
        for chunk in wrap_residues(&record.residues, line_width) {
            out.push_str(chunk);
            out.push('\n');
        }
    }
    out
}
