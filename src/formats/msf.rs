//! MSF codec.
//!
//! Reads MSF (GCG multiple sequence format) text into an [`MsfDocument`] and
//! writes pairwise sub-documents back out.
//!
//! ## MSF Format
//!
//! A free-form header, with one `Name:` declaration per sequence, ends at a
//! `//` line. Alignment blocks follow, separated by blank lines:
//! ```text
//! PileUp
//!
//!    MSF:   20  Type: P    Check:  5167   ..
//!
//!  Name: 1aab_   Len:   20  Check:  3411  Weight:  1.00
//!  Name: 1j46_A  Len:   20  Check:  1756  Weight:  1.00
//!
//! //
//!
//! 1aab_   GKGDPKKPRG KMSSYAFFVQ
//! 1j46_A  MQDRVKRPMN AFIVWSRDQR
//! ```
//!
//! Header lines are classified once while reading. Only `Name:` declarations
//! are ever dropped on output; every other line and every retained sequence
//! line is written back exactly as read.

use std::collections::BTreeSet;
use std::path::Path;

use thiserror::Error;

use crate::model::{AlignmentBlock, HeaderLine, MsfDocument, MsfHeader, SequenceLine};

/// Trimmed content of the line that closes the header.
pub const TERMINATOR: &str = "//";

const NAME_TAG: &str = "Name:";

/// Errors that can occur during MSF parsing.
#[derive(Error, Debug)]
pub enum MsfError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing '//' header terminator")]
    MissingTerminator,

    #[error("Block {block} has identifiers [{found}], expected [{expected}]")]
    InconsistentBlock {
        block: usize,
        expected: String,
        found: String,
    },
}

/// Result type for MSF operations.
pub type MsfResult<T> = Result<T, MsfError>;

/// Parses an MSF file into a document.
pub fn parse_msf_file<P: AsRef<Path>>(path: P) -> MsfResult<MsfDocument> {
    let content = super::read_to_string(path)?;
    parse_msf_str(&content)
}

/// Parses MSF content from a string.
pub fn parse_msf_str(content: &str) -> MsfResult<MsfDocument> {
    let mut lines = content.lines();

    let mut header = Vec::new();
    let mut terminated = false;
    for line in lines.by_ref() {
        header.push(classify_header_line(line));
        if line.trim() == TERMINATOR {
            terminated = true;
            break;
        }
    }
    if !terminated {
        return Err(MsfError::MissingTerminator);
    }

    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in lines {
        match line.split_whitespace().next() {
            None => {
                if !current.is_empty() {
                    blocks.push(AlignmentBlock::new(std::mem::take(&mut current)));
                }
            }
            Some(id) => current.push(SequenceLine::new(id, line)),
        }
    }
    if !current.is_empty() {
        blocks.push(AlignmentBlock::new(current));
    }

    Ok(MsfDocument::new(MsfHeader::new(header), blocks))
}

/// Classifies one header line.
///
/// A line is a `Name:` declaration when its trimmed form starts with `Name:`
/// and has a second whitespace-delimited token, which becomes the id.
fn classify_header_line(line: &str) -> HeaderLine {
    let body = line.trim_start();
    let indent = &line[..line.len() - body.len()];

    if !body.starts_with(NAME_TAG) {
        return HeaderLine::Other(line.to_string());
    }

    let Some(first_end) = body.find(char::is_whitespace) else {
        return HeaderLine::Other(line.to_string());
    };
    let id_part = body[first_end..].trim_start();
    if id_part.is_empty() {
        return HeaderLine::Other(line.to_string());
    }

    let id_start = body.len() - id_part.len();
    let id_end = id_part
        .find(char::is_whitespace)
        .map(|i| id_start + i)
        .unwrap_or(body.len());

    HeaderLine::NameDeclaration {
        indent: indent.to_string(),
        label: body[..id_start].to_string(),
        id: body[id_start..id_end].to_string(),
        rest: body[id_end..].to_string(),
    }
}

/// Keeps every header line except `Name:` declarations of ids outside `keep`.
pub fn filter_header(header: &MsfHeader, keep: &[&str]) -> Vec<String> {
    header
        .lines
        .iter()
        .filter(|line| match line.declared_id() {
            Some(id) => keep.contains(&id),
            None => true,
        })
        .map(HeaderLine::render)
        .collect()
}

/// Keeps, in block order, the lines whose id is in `keep`.
///
/// The result may hold fewer than two lines; it is still a block.
pub fn filter_block<'a>(block: &'a AlignmentBlock, keep: &[&str]) -> Vec<&'a SequenceLine> {
    block
        .lines
        .iter()
        .filter(|line| keep.contains(&line.id.as_str()))
        .collect()
}

/// Serializes a header and filtered blocks to MSF text.
///
/// One blank line follows the header and each block, whatever the source
/// spacing was.
pub fn write_msf(header_lines: &[String], blocks: &[Vec<&SequenceLine>]) -> String {
    let mut out = String::new();
    for line in header_lines {
        out.push_str(line);
        out.push('\n');
    }
    out.push('\n');
    for block in blocks {
        for line in block {
            out.push_str(&line.raw);
            out.push('\n');
        }
        out.push('\n');
    }
    out
}

/// Renders the two-sequence sub-document of `doc` for ids `a` and `b`.
pub fn pair_document(doc: &MsfDocument, a: &str, b: &str) -> String {
    let keep = [a, b];
    let header = filter_header(&doc.header, &keep);
    let blocks: Vec<Vec<&SequenceLine>> = doc
        .blocks
        .iter()
        .map(|block| filter_block(block, &keep))
        .collect();
    write_msf(&header, &blocks)
}

/// Checks that every block carries exactly the first block's identifiers.
///
/// Lenient parsing never calls this; drivers run it in strict mode only.
pub fn check_block_identifiers(doc: &MsfDocument) -> MsfResult<()> {
    let Some((first, rest)) = doc.blocks.split_first() else {
        return Ok(());
    };
    let expected: BTreeSet<&str> = first.ids().collect();

    for (idx, block) in rest.iter().enumerate() {
        let found: BTreeSet<&str> = block.ids().collect();
        if found != expected || found.len() != block.len() {
            return Err(MsfError::InconsistentBlock {
                block: idx + 2,
                expected: join_ids(&expected),
                found: block.ids().collect::<Vec<_>>().join(", "),
            });
        }
    }
    Ok(())
}

fn join_ids(ids: &BTreeSet<&str>) -> String {
    ids.iter().copied().collect::<Vec<_>>().join(", ")
}
