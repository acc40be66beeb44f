//! Pairwise aligner orchestration.
//!
//! Walks a tree of single-sequence FASTA folders (as written by
//! [`crate::split::split_fasta_dir`]) and runs an external aligner once per
//! unordered pair of files in each folder:
//!
//! ```text
//! <executable> <folder>/<a>.fa <folder>/<b>.fa  >  <output>/<folder>/<folder>_<a>__<b>.msf
//! ```
//!
//! The aligner is expected to print `Alignment score: <n>` on stdout and may
//! report `Execution time: ...` on stderr. A failing pair is logged and
//! skipped; there is no timeout and no retry.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, error, info};
use thiserror::Error;

use crate::pairs::pairs;
use crate::prefix::PrefixStripper;
use crate::telemetry::{AlignerReport, TelemetryParser};

/// Errors that stop a whole run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Cannot list {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot create {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors for a single pair; logged, never fatal.
#[derive(Error, Debug)]
pub enum PairRunError {
    #[error("Failed to start {}: {source}", .executable.display())]
    Spawn {
        executable: PathBuf,
        source: std::io::Error,
    },

    #[error("Aligner exited with {status}: {stderr}")]
    Status { status: String, stderr: String },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Options for [`run_pairs`].
#[derive(Debug, Clone)]
pub struct RunPairsOptions {
    /// Root holding one subfolder of single-sequence FASTA files per input
    pub input_root: PathBuf,
    pub executable: PathBuf,
    pub output_root: PathBuf,
    /// Remove the `<folder>_` prefix from names in the aligner output
    pub strip_prefix: bool,
}

/// One successful aligner invocation.
#[derive(Debug, Clone)]
pub struct PairOutcome {
    pub folder: String,
    pub first: String,
    pub second: String,
    pub output: PathBuf,
    pub report: AlignerReport,
}

/// Totals for one run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub outcomes: Vec<PairOutcome>,
    pub failures: usize,
}

impl RunSummary {
    pub fn alignments(&self) -> usize {
        self.outcomes.len()
    }
}

/// Runs the aligner over every pair of FASTA files in every input subfolder.
pub fn run_pairs(options: &RunPairsOptions) -> Result<RunSummary, RunError> {
    let telemetry = TelemetryParser::new()?;
    create_dir(&options.output_root)?;

    let mut summary = RunSummary::default();
    for folder in list_sorted(&options.input_root, |p| p.is_dir())? {
        let name = file_name(&folder);
        let out_dir = options.output_root.join(&name);
        create_dir(&out_dir)?;

        let stripper = if options.strip_prefix {
            Some(PrefixStripper::new(&name)?)
        } else {
            None
        };

        let files = list_sorted(&folder, |p| p.is_file() && is_fasta_name(p))?;
        let names: Vec<String> = files.iter().map(|p| file_name(p)).collect();
        info!("{}: {} sequences", name, names.len());

        // File names within one directory are unique
        let Ok(pair_iter) = pairs(&names) else {
            continue;
        };
        for (a, b) in pair_iter {
            let first = folder.join(a);
            let second = folder.join(b);
            let job = PairJob {
                folder: &name,
                first: &first,
                second: &second,
                out_dir: &out_dir,
            };
            match job.run(options, stripper.as_ref(), &telemetry) {
                Ok(outcome) => summary.outcomes.push(outcome),
                Err(e) => {
                    error!("{} vs {}: {}", a, b, e);
                    summary.failures += 1;
                }
            }
        }
    }
    Ok(summary)
}

struct PairJob<'a> {
    folder: &'a str,
    first: &'a Path,
    second: &'a Path,
    out_dir: &'a Path,
}

impl PairJob<'_> {
    fn run(
        &self,
        options: &RunPairsOptions,
        stripper: Option<&PrefixStripper>,
        telemetry: &TelemetryParser,
    ) -> Result<PairOutcome, PairRunError> {
        debug!(
            "running {} {} {}",
            options.executable.display(),
            self.first.display(),
            self.second.display()
        );
        let output = Command::new(&options.executable)
            .arg(self.first)
            .arg(self.second)
            .output()
            .map_err(|source| PairRunError::Spawn {
                executable: options.executable.clone(),
                source,
            })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            return Err(PairRunError::Status {
                status: output.status.to_string(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let report = telemetry.parse(&stdout, &stderr);
        let content = match stripper {
            Some(stripper) => stripper.apply(&stdout),
            None => stdout.into_owned(),
        };

        let first = file_stem(self.first);
        let second = file_stem(self.second);
        let out_path = self
            .out_dir
            .join(format!("{}_{}__{}.msf", self.folder, first, second));
        fs::write(&out_path, content).map_err(|source| PairRunError::Write {
            path: out_path.clone(),
            source,
        })?;

        info!(
            "wrote {} (score: {}, time: {})",
            out_path.display(),
            report
                .score
                .map_or_else(|| "n/a".to_string(), |s| s.to_string()),
            report
                .time_ms
                .map_or_else(|| "n/a".to_string(), |t| format!("{:.3} ms", t)),
        );

        Ok(PairOutcome {
            folder: self.folder.to_string(),
            first,
            second,
            output: out_path,
            report,
        })
    }
}

fn is_fasta_name(path: &Path) -> bool {
    let name = file_name(path).to_lowercase();
    name.ends_with(".fa") || name.ends_with(".fasta")
}

fn list_sorted<F>(dir: &Path, keep: F) -> Result<Vec<PathBuf>, RunError>
where
    F: Fn(&Path) -> bool,
{
    let list_err = |source| RunError::ListDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(list_err)? {
        let path = entry.map_err(list_err)?.path();
        if keep(&path) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn create_dir(dir: &Path) -> Result<(), RunError> {
    fs::create_dir_all(dir).map_err(|source| RunError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    use std::os::unix::fs::PermissionsExt;
    use std::sync::Mutex;

    use tempfile::TempDir;

    // Writing a script while another test thread forks can fail with ETXTBSY
    static SPAWN_LOCK: Mutex<()> = Mutex::new(());

    fn stub_aligner(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("aligner.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn fasta_tree(root: &Path) -> PathBuf {
        let input = root.join("pairwise_fasta");
        let folder = input.join("BB11001");
        fs::create_dir_all(&folder).unwrap();
        for id in ["1aab_", "1j46_A", "1k99_A"] {
            fs::write(
                folder.join(format!("BB11001_{}.fa", id)),
                format!(">BB11001_{}\nACGT\n", id),
            )
            .unwrap();
        }
        fs::write(folder.join("notes.txt"), "ignored").unwrap();
        input
    }

    #[test]
    fn test_runs_every_pair_and_strips_prefix() {
        let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = TempDir::new().unwrap();
        let input_root = fasta_tree(tmp.path());
        let executable = stub_aligner(
            tmp.path(),
            r#"a=$(head -n 1 "$1" | cut -c2-)
b=$(head -n 1 "$2" | cut -c2-)
echo "Alignment score: 42"
echo " Name: $a"
echo " Name: $b"
echo "CPU Execution time: 1.250 ms" >&2"#,
        );
        let options = RunPairsOptions {
            input_root,
            executable,
            output_root: tmp.path().join("out"),
            strip_prefix: true,
        };

        let summary = run_pairs(&options).unwrap();
        assert_eq!(summary.alignments(), 3);
        assert_eq!(summary.failures, 0);

        let first = &summary.outcomes[0];
        assert_eq!(first.first, "BB11001_1aab_");
        assert_eq!(first.second, "BB11001_1j46_A");
        assert_eq!(first.report.score, Some(42));
        assert_eq!(first.report.time_ms, Some(1.25));

        let expected = tmp
            .path()
            .join("out")
            .join("BB11001")
            .join("BB11001_BB11001_1aab___BB11001_1j46_A.msf");
        assert_eq!(first.output, expected);
        let text = fs::read_to_string(expected).unwrap();
        assert_eq!(text, "Alignment score: 42\n Name: 1aab_\n Name: 1j46_A\n");
    }

    #[test]
    fn test_failing_aligner_is_counted() {
        let _guard = SPAWN_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let tmp = TempDir::new().unwrap();
        let input_root = fasta_tree(tmp.path());
        let executable = stub_aligner(tmp.path(), "echo boom >&2\nexit 3");
        let options = RunPairsOptions {
            input_root,
            executable,
            output_root: tmp.path().join("out"),
            strip_prefix: false,
        };

        let summary = run_pairs(&options).unwrap();
        assert_eq!(summary.alignments(), 0);
        assert_eq!(summary.failures, 3);
        assert!(tmp.path().join("out").join("BB11001").is_dir());
    }

    #[test]
    fn test_missing_input_root() {
        let tmp = TempDir::new().unwrap();
        let options = RunPairsOptions {
            input_root: tmp.path().join("absent"),
            executable: PathBuf::from("/bin/true"),
            output_root: tmp.path().join("out"),
            strip_prefix: false,
        };
        assert!(matches!(run_pairs(&options), Err(RunError::ListDir { .. })));
    }
}
