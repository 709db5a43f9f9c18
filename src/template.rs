//! Placeholder substitution for codec argument templates.

/// Literal token replaced with the stage's input path at plan-build time.
pub const INFILE: &str = "INFILE";

/// Literal token replaced with the stage's output path at plan-build time.
pub const OUTFILE: &str = "OUTFILE";

/// An argument template for one codec invocation.
///
/// A template is an ordered token list parsed from a space-separated string,
/// with two literal placeholder tokens, [`INFILE`] and [`OUTFILE`].  The first
/// token conventionally names the program and is kept for logging; the actual
/// executable path is configured separately.
///
/// # Example
///
/// ```
/// use audioforge::template::CommandTemplate;
///
/// let tpl = CommandTemplate::parse("lame --decode INFILE OUTFILE");
/// assert!(tpl.validate().is_ok());
///
/// let argv = tpl.resolve("song.mp3", "/tmp/song.wav");
/// assert_eq!(argv, ["lame", "--decode", "song.mp3", "/tmp/song.wav"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    tokens: Vec<String>,
}

impl CommandTemplate {
    /// Parse a template from a space-separated token string.
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Check that the template names a program and carries both placeholders.
    ///
    /// Runs at load time so a broken template is rejected before any file is
    /// touched.  The error message names the absent slot.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.tokens.is_empty() {
            return Err("empty template".into());
        }
        if !self.tokens.iter().any(|t| t == INFILE) {
            return Err(format!("missing {INFILE} placeholder"));
        }
        if !self.tokens.iter().any(|t| t == OUTFILE) {
            return Err(format!("missing {OUTFILE} placeholder"));
        }
        Ok(())
    }

    /// Resolve the template into a concrete argument vector.
    ///
    /// Every token exactly equal to a placeholder is replaced, whole-token,
    /// across all occurrences.  Tokens merely containing a placeholder are
    /// left untouched.
    pub fn resolve(&self, input: &str, output: &str) -> Vec<String> {
        self.tokens
            .iter()
            .map(|t| match t.as_str() {
                INFILE => input.to_string(),
                OUTFILE => output.to_string(),
                _ => t.clone(),
            })
            .collect()
    }

    /// The token that names the program, if any.
    pub fn program(&self) -> Option<&str> {
        self.tokens.first().map(String::as_str)
    }

    /// Number of tokens in the template.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the template has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl std::fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_whitespace() {
        let tpl = CommandTemplate::parse("  flac  -d INFILE   -o OUTFILE ");
        assert_eq!(tpl.len(), 5);
        assert_eq!(tpl.program(), Some("flac"));
    }

    #[test]
    fn resolve_substitutes_all_occurrences() {
        let tpl = CommandTemplate::parse("tool INFILE OUTFILE INFILE");
        let argv = tpl.resolve("in.mp3", "out.wav");
        assert_eq!(argv, ["tool", "in.mp3", "out.wav", "in.mp3"]);
    }

    #[test]
    fn resolve_is_whole_token_only() {
        // A token containing (but not equal to) a placeholder is not touched.
        let tpl = CommandTemplate::parse("tool --in=INFILE INFILE OUTFILE");
        let argv = tpl.resolve("a.mp3", "b.wav");
        assert_eq!(argv, ["tool", "--in=INFILE", "a.mp3", "b.wav"]);
    }

    #[test]
    fn resolve_leaves_no_placeholders() {
        let tpl = CommandTemplate::parse("lame --preset standard INFILE OUTFILE");
        let argv = tpl.resolve("x.flac", "y.mp3");
        assert!(!argv.iter().any(|a| a == INFILE || a == OUTFILE));
    }

    #[test]
    fn validate_accepts_complete_template() {
        let tpl = CommandTemplate::parse("sox INFILE OUTFILE");
        assert!(tpl.validate().is_ok());
    }

    #[test]
    fn validate_names_missing_infile() {
        let tpl = CommandTemplate::parse("sox OUTFILE");
        let err = tpl.validate().unwrap_err();
        assert!(err.contains("INFILE"), "got: {err}");
    }

    #[test]
    fn validate_names_missing_outfile() {
        let tpl = CommandTemplate::parse("sox INFILE");
        let err = tpl.validate().unwrap_err();
        assert!(err.contains("OUTFILE"), "got: {err}");
    }

    #[test]
    fn validate_rejects_empty() {
        let tpl = CommandTemplate::parse("");
        assert!(tpl.validate().is_err());
    }

    #[test]
    fn display_round_trips_tokens() {
        let tpl = CommandTemplate::parse("oggenc -q 6 INFILE -o OUTFILE");
        assert_eq!(tpl.to_string(), "oggenc -q 6 INFILE -o OUTFILE");
    }
}
