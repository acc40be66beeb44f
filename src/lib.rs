//! # alnsplit - pairwise decomposition of alignment files
//!
//! Splits multi-sequence FASTA and MSF files into exhaustive sets of
//! single-sequence and two-sequence files for external pairwise aligners.
//!
//! ## Architecture
//!
//! - `model`: Value types for FASTA records and MSF documents
//! - `formats`: FASTA and MSF codecs
//! - `pairs`: Unordered pair enumeration
//! - `split`: Directory drivers writing one output subtree per input file
//! - `prefix`: Folder-prefix removal on rendered text
//! - `telemetry`: Score and timing extraction from aligner output
//! - `runner`: Runs an external aligner over every pair of FASTA files

pub mod formats;
pub mod model;
pub mod pairs;
pub mod prefix;
pub mod runner;
pub mod split;
pub mod telemetry;
