//! The unit of work: one file's full decode→encode pipeline.

use std::fmt;
use std::path::PathBuf;

/// A fully resolved conversion task for a single source file.
///
/// All paths and argument vectors are resolved at plan-build time; nothing is
/// computed during dispatch.  The leading token of each argument vector names
/// the program and is skipped when spawning.
#[derive(Debug, Clone)]
pub struct ConversionTask {
    /// Source filename as given (may carry a directory in single-file mode).
    pub source: String,
    /// Resolved source extension, lowercase.
    pub source_ext: String,
    /// Filename stem, used for display and log lines.
    pub short_name: String,
    /// Decode target in the scratch directory.
    pub intermediate: PathBuf,
    /// Encode target in the output directory.
    pub output: PathBuf,
    /// Decoder executable.
    pub decoder: PathBuf,
    /// Resolved decoder argument vector, placeholder-free.
    pub decode_args: Vec<String>,
    /// Encoder executable.
    pub encoder: PathBuf,
    /// Resolved encoder argument vector, placeholder-free.
    pub encode_args: Vec<String>,
    /// `false` when source and destination formats match (no-op conversion,
    /// kept for bookkeeping).
    pub should_process: bool,
    /// Whether to remove the intermediate file after the encode stage.
    pub delete_intermediate: bool,
}

impl ConversionTask {
    /// The ordering key: tasks are dispatched in ascending source-name order.
    pub fn source_name(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for ConversionTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  -- name='{}'", self.source)?;
        writeln!(
            f,
            "     ext={} process={} delete_intermediate={}",
            self.source_ext, self.should_process, self.delete_intermediate
        )?;
        writeln!(f, "     intermediate={}", self.intermediate.display())?;
        writeln!(f, "     output={}", self.output.display())?;
        writeln!(
            f,
            "     decode: {} ({})",
            self.decode_args.join(" "),
            self.decoder.display()
        )?;
        write!(
            f,
            "     encode: {} ({})",
            self.encode_args.join(" "),
            self.encoder.display()
        )
    }
}
