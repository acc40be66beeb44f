//! Directory decomposition drivers.
//!
//! - [`split_fasta_dir`]: one single-record FASTA file per input record
//! - [`split_msf_dir`]: one two-sequence MSF file per unordered pair
//!
//! Every input file of the requested format directly inside the input
//! directory gets its own output subdirectory named after the file stem.
//! A failing input is recorded in the [`SplitSummary`] and the run moves on
//! to the next one. Re-running into the same output root overwrites files
//! with identical content.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::formats::fasta::{parse_fasta_file, write_fasta, DEFAULT_LINE_WIDTH};
use crate::formats::msf::{check_block_identifiers, pair_document, parse_msf_file};
use crate::formats::{detect_format_from_extension, FileFormat, ParseError};
use crate::model::SequenceRecord;
use crate::pairs::{pair_count, pairs, PairError};

/// Default output subfolder for [`split_fasta_dir`].
pub const DEFAULT_FASTA_OUTNAME: &str = "pairwise_fasta";
/// Default output subfolder for [`split_msf_dir`].
pub const DEFAULT_MSF_OUTNAME: &str = "pairwise_msf";

/// Errors raised while decomposing one input file or listing the input.
#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Cannot list {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },

    #[error("Cannot pair sequences of {}: {source}", .path.display())]
    Contract { path: PathBuf, source: PairError },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result type for driver operations.
pub type SplitResult<T> = Result<T, SplitError>;

/// What happened to one input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// This many output files were written.
    Written(usize),
    /// The document had nothing to decompose.
    Skipped,
}

/// Totals for one driver run.
#[derive(Debug, Default)]
pub struct SplitSummary {
    /// Input files of the requested format that were found
    pub inputs: usize,
    pub files_written: usize,
    pub skipped: usize,
    pub failures: Vec<SplitError>,
}

impl SplitSummary {
    /// True when no input file failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record(&mut self, path: &Path, result: SplitResult<FileOutcome>) {
        match result {
            Ok(FileOutcome::Written(n)) => {
                info!("{}: wrote {} files", path.display(), n);
                self.files_written += n;
            }
            Ok(FileOutcome::Skipped) => {
                self.skipped += 1;
            }
            Err(e) => {
                error!("{}", e);
                self.failures.push(e);
            }
        }
    }
}

/// Options for [`split_fasta_dir`].
#[derive(Debug, Clone)]
pub struct FastaSplitOptions {
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
    /// Residues per output line
    pub line_width: usize,
    /// Write `>id` headers instead of `><basename>_<id>`
    pub bare_ids: bool,
}

impl FastaSplitOptions {
    /// Options with defaults: output under `<input_dir>/pairwise_fasta`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_root: input_dir.join(DEFAULT_FASTA_OUTNAME),
            input_dir,
            line_width: DEFAULT_LINE_WIDTH,
            bare_ids: false,
        }
    }
}

/// Options for [`split_msf_dir`].
#[derive(Debug, Clone)]
pub struct MsfSplitOptions {
    pub input_dir: PathBuf,
    pub output_root: PathBuf,
    /// Reject documents whose blocks do not all carry the first block's ids
    pub strict_blocks: bool,
}

impl MsfSplitOptions {
    /// Options with defaults: output under `<input_dir>/pairwise_msf`.
    pub fn new(input_dir: impl Into<PathBuf>) -> Self {
        let input_dir = input_dir.into();
        Self {
            output_root: input_dir.join(DEFAULT_MSF_OUTNAME),
            input_dir,
            strict_blocks: false,
        }
    }
}

/// Lists files of `format` directly inside `dir`, sorted by name.
pub fn list_inputs(dir: &Path, format: FileFormat) -> SplitResult<Vec<PathBuf>> {
    let list_err = |source| SplitError::ListDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut inputs = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if path.is_file() && detect_format_from_extension(&path) == Some(format) {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Splits every FASTA file in the input directory into single-record files.
///
/// Only listing the input directory or creating the output root can fail
/// the whole run.
pub fn split_fasta_dir(options: &FastaSplitOptions) -> SplitResult<SplitSummary> {
    run_inputs(
        &options.input_dir,
        &options.output_root,
        FileFormat::Fasta,
        |path| split_fasta_file(path, options),
    )
}

/// Splits one FASTA file into `<output_root>/<basename>/<basename>_<id>.fa`.
///
/// The output subdirectory is created even when the file has no records.
pub fn split_fasta_file(path: &Path, options: &FastaSplitOptions) -> SplitResult<FileOutcome> {
    let doc = parse_fasta_file(path).map_err(|e| SplitError::Parse {
        path: path.to_path_buf(),
        source: e.into(),
    })?;

    let base = basename(path);
    let out_dir = options.output_root.join(&base);
    create_dir(&out_dir)?;

    if doc.is_empty() {
        info!("{}: no records", path.display());
    }

    for record in &doc.records {
        let header_id = if options.bare_ids {
            record.id.clone()
        } else {
            format!("{}_{}", base, record.id)
        };
        let entry = SequenceRecord::new(header_id, record.residues.as_str());
        let out_path = out_dir.join(format!("{}_{}.fa", base, record.id));
        write_output(&out_path, &write_fasta([&entry], options.line_width))?;
    }

    Ok(FileOutcome::Written(doc.record_count()))
}

/// Splits every MSF file in the input directory into pairwise MSF files.
pub fn split_msf_dir(options: &MsfSplitOptions) -> SplitResult<SplitSummary> {
    run_inputs(
        &options.input_dir,
        &options.output_root,
        FileFormat::Msf,
        |path| split_msf_file(path, options),
    )
}

/// Splits one MSF file into `<output_root>/<basename>/<basename>_<A>__<B>.msf`.
///
/// Documents with fewer than two reference identifiers are skipped without
/// creating an output subdirectory.
pub fn split_msf_file(path: &Path, options: &MsfSplitOptions) -> SplitResult<FileOutcome> {
    let parse_err = |e: crate::formats::msf::MsfError| SplitError::Parse {
        path: path.to_path_buf(),
        source: e.into(),
    };

    let doc = parse_msf_file(path).map_err(parse_err)?;
    if options.strict_blocks {
        check_block_identifiers(&doc).map_err(parse_err)?;
    }

    let ids = doc.identifiers();
    if ids.len() < 2 {
        warn!(
            "{}: {} sequence(s) in first block, nothing to pair",
            path.display(),
            ids.len()
        );
        return Ok(FileOutcome::Skipped);
    }

    let pair_iter = pairs(&ids).map_err(|source| SplitError::Contract {
        path: path.to_path_buf(),
        source,
    })?;

    let base = basename(path);
    let out_dir = options.output_root.join(&base);
    create_dir(&out_dir)?;

    debug!(
        "{}: {} sequences, {} pairs, {} blocks",
        path.display(),
        ids.len(),
        pair_count(ids.len()),
        doc.block_count()
    );

    let mut written = 0;
    for (a, b) in pair_iter {
        let out_path = out_dir.join(format!("{}_{}__{}.msf", base, a, b));
        write_output(&out_path, &pair_document(&doc, a, b))?;
        written += 1;
    }

    Ok(FileOutcome::Written(written))
}

fn run_inputs<F>(
    input_dir: &Path,
    output_root: &Path,
    format: FileFormat,
    mut split_one: F,
) -> SplitResult<SplitSummary>
where
    F: FnMut(&Path) -> SplitResult<FileOutcome>,
{
    let inputs = list_inputs(input_dir, format)?;
    create_dir(output_root)?;
    info!(
        "{} {} file(s) in {}",
        inputs.len(),
        format,
        input_dir.display()
    );

    let mut summary = SplitSummary {
        inputs: inputs.len(),
        ..Default::default()
    };
    for path in &inputs {
        summary.record(path, split_one(path));
    }
    Ok(summary)
}

/// File stem used to name the output subdirectory and files.
fn basename(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn create_dir(dir: &Path) -> SplitResult<()> {
    fs::create_dir_all(dir).map_err(|source| SplitError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, content: &str) -> SplitResult<()> {
    fs::write(path, content).map_err(|source| SplitError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    const FOUR_SEQS: &str = "\
 BB11001.msf  MSF: 10  Type: P  Check: 100 ..

 Name: 1aab_   Len: 10
 Name: 1j46_A  Len: 10
 Name: 1k99_A  Len: 10
 Name: 2lef_A  Len: 10

//

1aab_   GKGDPKKPRG
1j46_A  MQDRVKRPMN
1k99_A  MKKLKKHPDF
2lef_A  MHIKKPLNAF
";

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_list_inputs_filters_and_sorts() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "b.msf", "//\n");
        write(tmp.path(), "a.MSF", "//\n");
        write(tmp.path(), "c.tfa", ">x\n");
        fs::create_dir(tmp.path().join("d.msf")).unwrap();

        let msf = list_inputs(tmp.path(), FileFormat::Msf).unwrap();
        let names: Vec<_> = msf
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.MSF", "b.msf"]);
    }

    #[test]
    fn test_list_inputs_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let result = list_inputs(&tmp.path().join("absent"), FileFormat::Fasta);
        assert!(matches!(result, Err(SplitError::ListDir { .. })));
    }

    #[test]
    fn test_split_msf_file_writes_all_pairs() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "BB11001.msf", FOUR_SEQS);
        let options = MsfSplitOptions::new(tmp.path());

        let outcome = split_msf_file(&path, &options).unwrap();
        assert_eq!(outcome, FileOutcome::Written(6));

        let out_dir = tmp.path().join("pairwise_msf").join("BB11001");
        for name in [
            "BB11001_1aab___1j46_A.msf",
            "BB11001_1aab___1k99_A.msf",
            "BB11001_1aab___2lef_A.msf",
            "BB11001_1j46_A__1k99_A.msf",
            "BB11001_1j46_A__2lef_A.msf",
            "BB11001_1k99_A__2lef_A.msf",
        ] {
            assert!(out_dir.join(name).is_file(), "missing {}", name);
        }

        let text = fs::read_to_string(out_dir.join("BB11001_1j46_A__2lef_A.msf")).unwrap();
        assert!(text.contains(" Name: 1j46_A  Len: 10\n"));
        assert!(text.contains(" Name: 2lef_A  Len: 10\n"));
        assert!(!text.contains("1aab_"));
        assert!(text.ends_with("1j46_A  MQDRVKRPMN\n2lef_A  MHIKKPLNAF\n\n"));
    }

    #[test]
    fn test_split_msf_file_skips_single_sequence() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "one.msf", " Name: a Len: 2\n//\n\na AC\n");
        let options = MsfSplitOptions::new(tmp.path());

        assert_eq!(split_msf_file(&path, &options).unwrap(), FileOutcome::Skipped);
        assert!(!tmp.path().join("pairwise_msf").join("one").exists());
    }

    #[test]
    fn test_split_msf_file_duplicate_ids() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "dup.msf", "//\n\na AC\nb AC\na AC\n");
        let options = MsfSplitOptions::new(tmp.path());

        let result = split_msf_file(&path, &options);
        assert!(matches!(
            result,
            Err(SplitError::Contract {
                source: PairError::DuplicateId(_),
                ..
            })
        ));
    }

    #[test]
    fn test_strict_blocks_rejects_mismatch() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "ragged.msf", "//\n\na AC\nb AC\n\na GT\n");

        let mut options = MsfSplitOptions::new(tmp.path());
        assert_eq!(split_msf_file(&path, &options).unwrap(), FileOutcome::Written(1));

        options.strict_blocks = true;
        let result = split_msf_file(&path, &options);
        assert!(matches!(result, Err(SplitError::Parse { .. })));
    }

    #[test]
    fn test_split_fasta_file_prefixes_headers() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "BB11001.tfa", ">s1 first\nACGTAC\n>s2\nGG\n");
        let mut options = FastaSplitOptions::new(tmp.path());
        options.line_width = 4;

        assert_eq!(split_fasta_file(&path, &options).unwrap(), FileOutcome::Written(2));

        let out_dir = tmp.path().join("pairwise_fasta").join("BB11001");
        let s1 = fs::read_to_string(out_dir.join("BB11001_s1.fa")).unwrap();
        assert_eq!(s1, ">BB11001_s1\nACGT\nAC\n");

        options.bare_ids = true;
        split_fasta_file(&path, &options).unwrap();
        let s2 = fs::read_to_string(out_dir.join("BB11001_s2.fa")).unwrap();
        assert_eq!(s2, ">s2\nGG\n");
    }

    #[test]
    fn test_split_fasta_file_reports_format_error() {
        let tmp = TempDir::new().unwrap();
        let path = write(tmp.path(), "bad.tfa", "ACGT\n>s1\nAC\n");
        let options = FastaSplitOptions::new(tmp.path());

        let err = split_fasta_file(&path, &options).unwrap_err();
        assert!(err.to_string().contains("Sequence without header at line 1"));
    }

    #[test]
    fn test_summary_counts_failures_and_continues() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "a.msf", "no terminator\n");
        write(tmp.path(), "b.msf", FOUR_SEQS);
        write(tmp.path(), "c.msf", "//\n");

        let summary = split_msf_dir(&MsfSplitOptions::new(tmp.path())).unwrap();
        assert_eq!(summary.inputs, 3);
        assert_eq!(summary.files_written, 6);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failures.len(), 1);
        assert!(!summary.is_clean());
    }
}
