//! Per-run job settings resolved from the command line.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::template::CommandTemplate;
use crate::{Error, Result};

/// Default number of concurrent conversions.
pub const DEFAULT_WORKERS: usize = 2;

/// Resolved settings for one conversion job.
#[derive(Debug)]
pub struct JobConfig {
    /// Destination format, lowercase (e.g. "mp3").
    pub dest_format: String,
    /// Directory converted files are written to.
    pub out_dir: PathBuf,
    /// When set, convert only this file instead of scanning the directory.
    pub single_file: Option<PathBuf>,
    /// Encoder-argument override replacing every tool's encode template for
    /// this run.
    pub custom_encoder_args: Option<CommandTemplate>,
    /// Worker-pool size, always at least 1.
    pub workers: usize,
    /// Per-stage log lines instead of the progress indicator.
    pub verbose: bool,
}

impl JobConfig {
    /// Build the job settings from parsed CLI arguments.
    ///
    /// Creates the output directory if absent and probes it for writability.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFormat`] if no destination format was given.
    /// - [`Error::Template`] if the encoder-settings override is invalid.
    /// - [`Error::OutputDir`] if the output directory cannot be used.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let dest_format = cli.format.ok_or(Error::MissingFormat)?.to_lowercase();

        let custom_encoder_args = match cli.encsettings {
            Some(raw) => {
                let tpl = CommandTemplate::parse(&raw);
                tpl.validate().map_err(Error::Template)?;
                Some(tpl)
            }
            None => None,
        };

        prepare_output_dir(&cli.outdir)?;

        Ok(Self {
            dest_format,
            out_dir: cli.outdir,
            single_file: cli.infile,
            custom_encoder_args,
            workers: cli.threads.max(1),
            verbose: cli.verbose,
        })
    }
}

impl fmt::Display for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Job:")?;
        writeln!(f, "  format: {}", self.dest_format)?;
        writeln!(f, "  outdir: {}", self.out_dir.display())?;
        writeln!(f, "  workers: {}", self.workers)?;
        match &self.single_file {
            Some(p) => writeln!(f, "  single file: {}", p.display())?,
            None => writeln!(f, "  single file: (none)")?,
        }
        match &self.custom_encoder_args {
            Some(t) => writeln!(f, "  custom encoder settings: {t}")?,
            None => writeln!(f, "  custom encoder settings: (none)")?,
        }
        write!(f, "  verbose: {}", if self.verbose { "yes" } else { "no" })
    }
}

/// Create the output directory if needed and check it is writable.
fn prepare_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        tracing::debug!(dir = %dir.display(), "output directory missing, creating");
        std::fs::create_dir_all(dir).map_err(|e| Error::output_dir(dir, e.to_string()))?;
    }

    let probe = dir.join(".audioforge-write-probe");
    std::fs::write(&probe, b"")
        .map_err(|e| Error::output_dir(dir, format!("not writable: {e}")))?;
    let _ = std::fs::remove_file(&probe);

    Ok(())
}
