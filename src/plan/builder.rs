//! Turns candidate filenames into fully resolved conversion tasks.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::task::ConversionTask;
use crate::config::ToolRegistry;
use crate::job::JobConfig;
use crate::{Error, Result};

/// The lossless interchange format used between the decode and encode stages.
pub const INTERMEDIATE_FORMAT: &str = "wav";

/// Why a candidate filename was excluded from the schedule.
///
/// All of these are non-fatal: the caller logs the reason and the job
/// proceeds with the remaining files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The filename's extension is not recognized by any registered tool.
    UnrecognizedExtension,
    /// No decoder is registered for the source extension.
    NoDecoder(String),
    /// No encoder is registered for the destination format.
    NoEncoder(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnrecognizedExtension => write!(f, "unrecognized extension"),
            SkipReason::NoDecoder(ext) => write!(f, "no decoder for '{ext}' files"),
            SkipReason::NoEncoder(dest) => write!(f, "no encoder for '{dest}' files"),
        }
    }
}

/// Builds [`ConversionTask`]s for one job.
///
/// Constructed once per run; the combined extension pattern is compiled from
/// all registered extensions up front and matched case-insensitively against
/// the end of each candidate name.
pub struct PlanBuilder<'a> {
    registry: &'a ToolRegistry,
    job: &'a JobConfig,
    scratch_dir: PathBuf,
    extensions: Regex,
}

impl<'a> PlanBuilder<'a> {
    /// Create a builder for the given registry, job settings, and scratch
    /// directory.
    pub fn new(registry: &'a ToolRegistry, job: &'a JobConfig, scratch_dir: PathBuf) -> Result<Self> {
        let alternation = registry
            .extensions()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");
        let extensions = Regex::new(&format!(r"(?i)\.({alternation})$"))
            .map_err(|e| Error::Internal(format!("invalid extension pattern: {e}")))?;

        Ok(Self {
            registry,
            job,
            scratch_dir,
            extensions,
        })
    }

    /// Resolve one candidate filename into a task, or the reason it is
    /// excluded from the schedule.
    pub fn plan(&self, filename: &str) -> std::result::Result<ConversionTask, SkipReason> {
        let file_name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        let caps = self
            .extensions
            .captures(file_name)
            .ok_or(SkipReason::UnrecognizedExtension)?;
        let dot_ext = caps.get(0).ok_or(SkipReason::UnrecognizedExtension)?;
        let ext = caps
            .get(1)
            .map(|m| m.as_str().to_lowercase())
            .ok_or(SkipReason::UnrecognizedExtension)?;

        let tool = self
            .registry
            .get(&ext)
            .ok_or_else(|| SkipReason::NoDecoder(ext.clone()))?;
        let enc_tool = self
            .registry
            .get(&self.job.dest_format)
            .ok_or_else(|| SkipReason::NoEncoder(self.job.dest_format.clone()))?;

        let stem = &file_name[..dot_ext.start()];
        let should_process = ext != self.job.dest_format;

        let intermediate = self
            .scratch_dir
            .join(format!("{stem}.{INTERMEDIATE_FORMAT}"));
        let output = self
            .job
            .out_dir
            .join(format!("{stem}.{}", self.job.dest_format));

        let decode_args = tool
            .decode
            .resolve(filename, &intermediate.to_string_lossy());
        let encode_template = self
            .job
            .custom_encoder_args
            .as_ref()
            .unwrap_or(&enc_tool.encode);
        let encode_args =
            encode_template.resolve(&intermediate.to_string_lossy(), &output.to_string_lossy());

        let delete_intermediate =
            ext != INTERMEDIATE_FORMAT && self.job.dest_format != INTERMEDIATE_FORMAT;

        Ok(ConversionTask {
            source: filename.to_string(),
            source_ext: ext,
            short_name: stem.to_string(),
            intermediate,
            output,
            decoder: tool.decoder.clone(),
            decode_args,
            encoder: enc_tool.encoder.clone(),
            encode_args,
            should_process,
            delete_intermediate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolDefinition;
    use crate::template::{CommandTemplate, INFILE, OUTFILE};

    fn tool(name: &str, enc: &str, dec: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            encoder: PathBuf::from(format!("/usr/bin/{}", enc.split(' ').next().unwrap())),
            encode: CommandTemplate::parse(enc),
            decoder: PathBuf::from(format!("/usr/bin/{}", dec.split(' ').next().unwrap())),
            decode: CommandTemplate::parse(dec),
        }
    }

    fn registry() -> ToolRegistry {
        ToolRegistry::from_tools(vec![
            tool("mp3", "lame INFILE OUTFILE", "lame -d INFILE OUTFILE"),
            tool("wav", "sox INFILE OUTFILE", "sox INFILE OUTFILE"),
            tool("flac", "flac -o OUTFILE INFILE", "flac -d -o OUTFILE INFILE"),
        ])
    }

    fn job(dest: &str) -> JobConfig {
        JobConfig {
            dest_format: dest.to_string(),
            out_dir: PathBuf::from("out"),
            single_file: None,
            custom_encoder_args: None,
            workers: 2,
            verbose: false,
        }
    }

    #[test]
    fn mp3_to_wav_scenario() {
        let registry = registry();
        let job = job("wav");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("song.mp3").unwrap();
        assert_eq!(task.source_ext, "mp3");
        assert_eq!(task.short_name, "song");
        assert_eq!(task.intermediate, PathBuf::from("scratch/song.wav"));
        assert_eq!(task.output, PathBuf::from("out/song.wav"));
        assert_eq!(
            task.decode_args,
            ["lame", "-d", "song.mp3", "scratch/song.wav"]
        );
        assert_eq!(
            task.encode_args,
            ["sox", "scratch/song.wav", "out/song.wav"]
        );
        assert!(task.should_process);
        // Destination is the interchange format itself.
        assert!(!task.delete_intermediate);
    }

    #[test]
    fn resolved_vectors_carry_no_placeholders() {
        let registry = registry();
        let job = job("mp3");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("track.flac").unwrap();
        for arg in task.decode_args.iter().chain(task.encode_args.iter()) {
            assert_ne!(arg, INFILE);
            assert_ne!(arg, OUTFILE);
        }
    }

    #[test]
    fn same_format_is_a_no_op() {
        let registry = registry();
        let job = job("flac");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("track.flac").unwrap();
        assert!(!task.should_process);
        // Still fully constructed for bookkeeping.
        assert_eq!(task.output, PathBuf::from("out/track.flac"));
    }

    #[test]
    fn unregistered_extension_is_skipped() {
        let registry = registry();
        let job = job("mp3");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        assert_eq!(
            builder.plan("clip.xyz").unwrap_err(),
            SkipReason::UnrecognizedExtension
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let registry = registry();
        let job = job("wav");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("SONG.MP3").unwrap();
        assert_eq!(task.source_ext, "mp3");
        assert_eq!(task.output, PathBuf::from("out/SONG.wav"));
    }

    #[test]
    fn extension_must_anchor_at_end() {
        let registry = registry();
        let job = job("wav");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        assert!(builder.plan("song.mp3.bak").is_err());
    }

    #[test]
    fn missing_encoder_for_destination() {
        let registry = registry();
        let job = job("ogg");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        assert_eq!(
            builder.plan("song.mp3").unwrap_err(),
            SkipReason::NoEncoder("ogg".into())
        );
    }

    #[test]
    fn delete_intermediate_unless_wav_involved() {
        let registry = registry();

        let to_mp3 = job("mp3");
        let builder = PlanBuilder::new(&registry, &to_mp3, PathBuf::from("scratch")).unwrap();
        assert!(builder.plan("track.flac").unwrap().delete_intermediate);
        // wav source: the "intermediate" is the source itself.
        assert!(!builder.plan("track.wav").unwrap().delete_intermediate);

        let to_wav = job("wav");
        let builder = PlanBuilder::new(&registry, &to_wav, PathBuf::from("scratch")).unwrap();
        assert!(!builder.plan("track.flac").unwrap().delete_intermediate);
    }

    #[test]
    fn custom_encoder_override_replaces_template() {
        let registry = registry();
        let mut job = job("mp3");
        job.custom_encoder_args = Some(CommandTemplate::parse("lame -b 192 INFILE OUTFILE"));
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("track.flac").unwrap();
        assert_eq!(
            task.encode_args,
            ["lame", "-b", "192", "scratch/track.wav", "out/track.mp3"]
        );
        // The executable still comes from the tool definition.
        assert_eq!(task.encoder, PathBuf::from("/usr/bin/lame"));
    }

    #[test]
    fn single_file_path_keeps_full_source() {
        let registry = registry();
        let job = job("wav");
        let builder = PlanBuilder::new(&registry, &job, PathBuf::from("scratch")).unwrap();

        let task = builder.plan("music/album/song.mp3").unwrap();
        assert_eq!(task.source, "music/album/song.mp3");
        // Decode input is the path as given; derived names use the file name.
        assert_eq!(task.decode_args[2], "music/album/song.mp3");
        assert_eq!(task.intermediate, PathBuf::from("scratch/song.wav"));
        assert_eq!(task.output, PathBuf::from("out/song.wav"));
    }
}
