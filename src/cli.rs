use clap::Parser;
use std::path::PathBuf;

/// Batch-convert audio files between formats using external codec tools.
///
/// By default every recognized audio file in the current directory is
/// converted to the requested format; `--infile` restricts the run to a
/// single file. Decoder and encoder commands come from the per-user
/// configuration file (one tool per line, comma-separated fields).
#[derive(Parser, Debug)]
#[command(name = "audioforge")]
#[command(author, version, about = "Batch audio conversion driven by external codec tools")]
pub struct Cli {
    /// Extension of the format to convert to (e.g. mp3, flac, ogg)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Directory to place converted files in (created if absent)
    #[arg(short, long, default_value = ".")]
    pub outdir: PathBuf,

    /// Convert a single file instead of scanning the current directory
    #[arg(short, long)]
    pub infile: Option<PathBuf>,

    /// Override the configured encoder settings for this run,
    /// e.g. "lame -V5 INFILE OUTFILE" (INFILE/OUTFILE are literal)
    #[arg(short, long)]
    pub encsettings: Option<String>,

    /// Number of files to convert concurrently
    #[arg(short, long, default_value_t = 2)]
    pub threads: usize,

    /// Path to the tool configuration file (default ~/.audioforge.conf)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log each stage instead of showing the progress indicator
    #[arg(short, long)]
    pub verbose: bool,
}
