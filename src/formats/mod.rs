//! Alignment file codecs.
//!
//! Supports:
//! - FASTA (.tfa, .fa, .fasta, .fas)
//! - MSF (.msf)
//!
//! Formats are recognised by file extension only; the drivers never guess
//! from content.

pub mod fasta;
pub mod msf;

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use thiserror::Error;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Fasta,
    Msf,
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileFormat::Fasta => write!(f, "FASTA"),
            FileFormat::Msf => write!(f, "MSF"),
        }
    }
}

/// Errors that can occur while reading an input document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to open file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("FASTA error: {0}")]
    FastaError(#[from] fasta::FastaError),

    #[error("MSF error: {0}")]
    MsfError(#[from] msf::MsfError),
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Detects format from file extension, ignoring case.
pub fn detect_format_from_extension<P: AsRef<Path>>(path: P) -> Option<FileFormat> {
    let ext = path.as_ref().extension().and_then(OsStr::to_str)?;
    match ext.to_lowercase().as_str() {
        "tfa" | "fa" | "fasta" | "fas" => Some(FileFormat::Fasta),
        "msf" => Some(FileFormat::Msf),
        _ => None,
    }
}

/// Reads a whole file into memory.
pub(crate) fn read_to_string<P: AsRef<Path>>(path: P) -> std::io::Result<String> {
    let file = File::open(&path)?;
    let file_size = file.metadata()?.len() as usize;

    let mut reader = BufReader::with_capacity(1024 * 1024, file);
    let mut content = String::with_capacity(file_size);
    reader.read_to_string(&mut content)?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_extension("BB11001.tfa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.fa"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.FASTA"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("test.fas"), Some(FileFormat::Fasta));
        assert_eq!(detect_format_from_extension("BB11001.msf"), Some(FileFormat::Msf));
        assert_eq!(detect_format_from_extension("BB11001.MSF"), Some(FileFormat::Msf));
        assert_eq!(detect_format_from_extension("notes.txt"), None);
        assert_eq!(detect_format_from_extension("msf"), None);
    }

    #[test]
    fn test_parse_error_wraps_codec_errors() {
        let err: ParseError = msf::MsfError::MissingTerminator.into();
        assert_eq!(err.to_string(), "MSF error: Missing '//' header terminator");

        let err: ParseError = fasta::FastaError::SequenceWithoutHeader(1).into();
        assert_eq!(err.to_string(), "FASTA error: Sequence without header at line 1");
    }
}
