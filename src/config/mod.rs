//! Tool registry loaded from the per-user configuration file.
//!
//! The file lists one tool per line as five comma-separated fields:
//!
//! ```text
//! name, encoderPath, encoderArgs, decoderPath, decoderArgs
//! ```
//!
//! where `name` is the file extension the tool handles and the argument
//! fields are space-separated token lists using the `INFILE`/`OUTFILE`
//! placeholders, e.g.
//!
//! ```text
//! mp3, /usr/bin/lame, lame --preset standard INFILE OUTFILE, /usr/bin/lame, lame --decode INFILE OUTFILE
//! ```

use std::path::{Path, PathBuf};

use crate::template::CommandTemplate;
use crate::{Error, Result};

/// Default location of the tool configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "~/.audioforge.conf";

/// One configured codec tool: the decoder and encoder for a single format.
///
/// Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    /// File extension this tool handles, lowercase (e.g. "mp3").
    pub name: String,
    /// Resolved encoder executable path.
    pub encoder: PathBuf,
    /// Encoder argument template.
    pub encode: CommandTemplate,
    /// Resolved decoder executable path.
    pub decoder: PathBuf,
    /// Decoder argument template.
    pub decode: CommandTemplate,
}

/// The set of configured tools, looked up case-insensitively by extension.
///
/// Loaded once per job and read-only afterwards.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// Build a registry directly from tool definitions.
    pub fn from_tools(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    /// Load the registry from a configuration file.
    ///
    /// Blank lines are skipped.  A malformed line is a fatal configuration
    /// error naming the line number.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(path, format!("failed to read: {e}")))?;

        let mut tools = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let tool = parse_line(line)
                .map_err(|msg| Error::config(path, format!("line {}: {}", idx + 1, msg)))?;
            tracing::debug!(name = %tool.name, decoder = %tool.decoder.display(),
                encoder = %tool.encoder.display(), "registered tool");
            tools.push(tool);
        }

        Ok(Self { tools })
    }

    /// Look up the tool for an extension, case-insensitively.
    pub fn get(&self, ext: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name.eq_ignore_ascii_case(ext))
    }

    /// Whether any tool handles the given extension.
    pub fn has(&self, ext: &str) -> bool {
        self.get(ext).is_some()
    }

    /// Iterate over the registered extension names.
    pub fn extensions(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name.as_str())
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

fn parse_line(line: &str) -> std::result::Result<ToolDefinition, String> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 5 {
        return Err(format!(
            "expected 5 comma-separated fields, found {}",
            fields.len()
        ));
    }

    let name = fields[0].to_lowercase();
    if name.is_empty() {
        return Err("empty format name".into());
    }

    let encode = CommandTemplate::parse(fields[2]);
    encode
        .validate()
        .map_err(|msg| format!("encoder template {msg}"))?;

    let decode = CommandTemplate::parse(fields[4]);
    decode
        .validate()
        .map_err(|msg| format!("decoder template {msg}"))?;

    Ok(ToolDefinition {
        name,
        encoder: resolve_tool_path(fields[1]),
        encode,
        decoder: resolve_tool_path(fields[3]),
        decode,
    })
}

/// Resolve a configured executable path, preferring an existing path over a
/// `PATH` lookup.
///
/// Resolution is best-effort: when both fail the configured string is kept
/// and the spawn failure surfaces later as a stage failure.
pub fn resolve_tool_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);
    if path.exists() {
        return path.to_path_buf();
    }
    if let Some(name) = path.file_name() {
        if let Ok(found) = which::which(name) {
            return found;
        }
    }
    path.to_path_buf()
}

/// The default configuration file location, with `~` expanded.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(shellexpand::tilde(DEFAULT_CONFIG_PATH).as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_conf(content: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn load_two_tools() {
        let f = write_conf(
            "mp3, /usr/bin/lame, lame --preset standard INFILE OUTFILE, /usr/bin/lame, lame --decode INFILE OUTFILE\n\
             \n\
             flac, /usr/bin/flac, flac -o OUTFILE INFILE, /usr/bin/flac, flac -d -o OUTFILE INFILE\n",
        );
        let registry = ToolRegistry::load(f.path()).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.has("mp3"));
        assert!(registry.has("flac"));
        assert!(!registry.has("ogg"));

        let mp3 = registry.get("mp3").unwrap();
        assert_eq!(mp3.decode.program(), Some("lame"));
        assert_eq!(mp3.encode.program(), Some("lame"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let f = write_conf("mp3, lame, lame INFILE OUTFILE, lame, lame --decode INFILE OUTFILE\n");
        let registry = ToolRegistry::load(f.path()).unwrap();
        assert!(registry.has("MP3"));
        assert!(registry.get("Mp3").is_some());
    }

    #[test]
    fn name_is_lowercased() {
        let f = write_conf("WV, wv, wv INFILE OUTFILE, wv, wv -d INFILE OUTFILE\n");
        let registry = ToolRegistry::load(f.path()).unwrap();
        assert_eq!(registry.extensions().collect::<Vec<_>>(), vec!["wv"]);
    }

    #[test]
    fn malformed_line_names_line_number() {
        let f = write_conf(
            "mp3, lame, lame INFILE OUTFILE, lame, lame --decode INFILE OUTFILE\n\
             this line is broken\n",
        );
        let err = ToolRegistry::load(f.path()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("line 2"), "got: {err}");
    }

    #[test]
    fn template_missing_placeholder_is_fatal() {
        let f = write_conf("mp3, lame, lame INFILE, lame, lame --decode INFILE OUTFILE\n");
        let err = ToolRegistry::load(f.path()).unwrap_err();
        assert!(err.to_string().contains("OUTFILE"), "got: {err}");
    }

    #[test]
    fn unreadable_file_is_config_error() {
        let err = ToolRegistry::load(Path::new("/nonexistent/audioforge.conf")).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn resolve_prefers_existing_path() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let resolved = resolve_tool_path(&f.path().to_string_lossy());
        assert_eq!(resolved, f.path());
    }

    #[test]
    fn resolve_keeps_configured_string_when_unfindable() {
        let resolved = resolve_tool_path("/opt/missing/bin/nonexistent_codec_xyz");
        assert_eq!(resolved, PathBuf::from("/opt/missing/bin/nonexistent_codec_xyz"));
    }
}
