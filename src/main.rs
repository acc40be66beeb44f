//! alnsplit - pairwise decomposition of alignment files
//!
//! ## Usage
//!
//! ```bash
//! alnsplit split-fasta <dir>                # one .fa per record
//! alnsplit split-msf <dir>                  # one .msf per pair of sequences
//! alnsplit run-pairs <fasta_root> <aligner> <out_dir> --strip-prefix
//! ```
//!
//! Set `RUST_LOG=debug` to see every file written.

// Use jemalloc for better memory management (returns memory to OS)
#[cfg(not(windows))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use alnsplit::formats::fasta::DEFAULT_LINE_WIDTH;
use alnsplit::runner::{run_pairs, RunPairsOptions};
use alnsplit::split::{
    split_fasta_dir, split_msf_dir, FastaSplitOptions, MsfSplitOptions, SplitSummary,
    DEFAULT_FASTA_OUTNAME, DEFAULT_MSF_OUTNAME,
};

/// Split multi-sequence FASTA and MSF files into single-sequence and
/// pairwise files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract each record of every .tfa/.fa/.fasta file into its own FASTA file
    SplitFasta(SplitFastaArgs),
    /// Write one two-sequence MSF file per pair of sequences of every .msf file
    SplitMsf(SplitMsfArgs),
    /// Run an external aligner on every pair of FASTA files in each subfolder
    RunPairs(RunPairsArgs),
}

/// Where to put the output tree.
#[derive(Args, Debug)]
struct OutputArgs {
    /// Name of the output subfolder created inside the input directory
    #[arg(long = "outname")]
    outname: Option<String>,

    /// Explicit output directory (overrides --outname)
    #[arg(short = 'o', long = "output-dir", conflicts_with = "outname")]
    output_dir: Option<PathBuf>,
}

impl OutputArgs {
    fn resolve(&self, input_dir: &Path, default_name: &str) -> PathBuf {
        match (&self.output_dir, &self.outname) {
            (Some(dir), _) => dir.clone(),
            (None, Some(name)) => input_dir.join(name),
            (None, None) => input_dir.join(default_name),
        }
    }
}

#[derive(Args, Debug)]
struct SplitFastaArgs {
    /// Directory containing multi-sequence FASTA files
    input_dir: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Residues per line in the output files
    #[arg(short = 'w', long = "line-width", default_value_t = DEFAULT_LINE_WIDTH)]
    line_width: usize,

    /// Write the plain record id as header instead of <basename>_<id>
    #[arg(long = "bare-ids")]
    bare_ids: bool,
}

#[derive(Args, Debug)]
struct SplitMsfArgs {
    /// Directory containing .msf files
    input_dir: PathBuf,

    #[command(flatten)]
    output: OutputArgs,

    /// Reject files whose blocks do not all list the first block's sequences
    #[arg(long = "strict-blocks")]
    strict_blocks: bool,
}

#[derive(Args, Debug)]
struct RunPairsArgs {
    /// Root directory of single-sequence FASTA subfolders
    input_root: PathBuf,

    /// Pairwise aligner executable, called as `<aligner> <a.fa> <b.fa>`
    executable: PathBuf,

    /// Directory to store the aligner outputs
    output_root: PathBuf,

    /// Strip the folder-name prefix from sequence names in the outputs
    #[arg(long = "strip-prefix")]
    strip_prefix: bool,
}

fn run_split_fasta(args: SplitFastaArgs) -> Result<()> {
    if args.line_width == 0 {
        anyhow::bail!("Line width must be at least 1");
    }
    let options = FastaSplitOptions {
        output_root: args.output.resolve(&args.input_dir, DEFAULT_FASTA_OUTNAME),
        input_dir: args.input_dir,
        line_width: args.line_width,
        bare_ids: args.bare_ids,
    };
    let summary = split_fasta_dir(&options)
        .with_context(|| format!("splitting FASTA files in {}", options.input_dir.display()))?;

    println!(
        "Extracted {} sequences into separate FASTA files under:\n  {}",
        summary.files_written,
        options.output_root.display()
    );
    finish(&summary)
}

fn run_split_msf(args: SplitMsfArgs) -> Result<()> {
    let options = MsfSplitOptions {
        output_root: args.output.resolve(&args.input_dir, DEFAULT_MSF_OUTNAME),
        input_dir: args.input_dir,
        strict_blocks: args.strict_blocks,
    };
    let summary = split_msf_dir(&options)
        .with_context(|| format!("splitting MSF files in {}", options.input_dir.display()))?;

    println!(
        "Wrote {} pairwise MSF files under:\n  {}",
        summary.files_written,
        options.output_root.display()
    );
    finish(&summary)
}

fn run_run_pairs(args: RunPairsArgs) -> Result<()> {
    let options = RunPairsOptions {
        input_root: args.input_root,
        executable: args.executable,
        output_root: args.output_root,
        strip_prefix: args.strip_prefix,
    };
    let summary = run_pairs(&options)
        .with_context(|| format!("running aligner over {}", options.input_root.display()))?;

    println!(
        "Processed {} alignments across all folders.",
        summary.alignments()
    );
    if summary.failures > 0 {
        anyhow::bail!("{} alignment(s) failed", summary.failures);
    }
    Ok(())
}

/// Turns per-file failures into a non-zero exit once every file was tried.
fn finish(summary: &SplitSummary) -> Result<()> {
    if summary.skipped > 0 {
        eprintln!("Skipped {} file(s) with fewer than two sequences", summary.skipped);
    }
    if !summary.is_clean() {
        anyhow::bail!(
            "{} of {} input file(s) failed",
            summary.failures.len(),
            summary.inputs
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::SplitFasta(args) => run_split_fasta(args),
        Command::SplitMsf(args) => run_split_msf(args),
        Command::RunPairs(args) => run_run_pairs(args),
    }
}
