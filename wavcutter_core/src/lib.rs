//! Split one long WAV recording of discrete notes into a file per note.
//!
//! The input must be a little-endian 24-bit PCM container. It is decoded in
//! full, walked in fixed eight-second windows, and every window with an
//! audible note is trimmed at its last audible sample, given a short linear
//! fade-out and written back out as its own WAV next to the input, named
//! after the pitch its position corresponds to.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;
use thiserror::Error;

pub mod segment;
pub mod wav;

pub use segment::{note_suffix, NoteSegment, Segmenter};
pub use wav::{AudioData, WavHeader};

/// Errors that can occur while cutting a recording into notes.
#[derive(Debug, Error)]
pub enum WavCutterError {
    /// Wrapper around IO errors encountered while reading or writing files.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The container advertises a format outside the supported subset.
    #[error("unsupported format: {reason}")]
    UnsupportedFormat { reason: &'static str },

    /// The subchunk scan ran out of buffer without finding a `data` tag.
    #[error("no 'data' subchunk found within the container bounds")]
    MalformedContainer,

    /// Error returned when a sample width other than 3 bytes reaches the
    /// encoder.
    #[error("cannot encode {bytes_per_sample}-byte samples, only 3-byte PCM is supported")]
    EncodingUnsupported { bytes_per_sample: usize },

    /// The recording holds more note windows than the pitch-name table.
    #[error("note name table exhausted after {limit} entries")]
    NoteTableExhausted { limit: usize },

    /// Error produced when a file name cannot be derived from the input path.
    #[error("failed to derive a base name for the input file")]
    InvalidInputName,
}

/// Configuration for one cutting run.
#[derive(Clone, Debug)]
pub struct Config {
    /// Canonicalized path of the recording to cut.
    input_path: PathBuf,
    /// Directory the note files are written to; the input's directory.
    output_dir: PathBuf,
    /// Name prefix shared by all note files; the input's file stem.
    prefix: String,
    /// Whether note files left over from a previous run are deleted first.
    clean_previous: bool,
}

impl Config {
    /// Construct a [`Config`] with default options, canonicalizing the path.
    pub fn new<P: AsRef<Path>>(input: P) -> Result<Self, WavCutterError> {
        Self::builder(input).build()
    }

    pub fn builder<P: AsRef<Path>>(input: P) -> ConfigBuilder {
        ConfigBuilder {
            input: input.as_ref().to_path_buf(),
            clean_previous: true,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

/// Builder for [`Config`].
#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    input: PathBuf,
    clean_previous: bool,
}

impl ConfigBuilder {
    /// Toggle deletion of note files from a previous run (default `true`).
    pub fn clean_previous(mut self, clean: bool) -> Self {
        self.clean_previous = clean;
        self
    }

    pub fn build(self) -> Result<Config, WavCutterError> {
        let input_path = fs::canonicalize(&self.input)?;
        let output_dir = input_path
            .parent()
            .ok_or(WavCutterError::InvalidInputName)?
            .to_path_buf();
        let prefix = input_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(WavCutterError::InvalidInputName)?
            .to_owned();

        Ok(Config {
            input_path,
            output_dir,
            prefix,
            clean_previous: self.clean_previous,
        })
    }
}

/// Progress notifications emitted while a run advances.
#[derive(Clone, Debug)]
pub enum ProgressEvent {
    /// Decoding finished; the total number of note windows is known.
    Start { total_windows: u64 },
    /// One window was processed, exported or skipped as silent.
    Window { index: u64, exported: bool },
    /// All windows were processed.
    Finish,
}

/// Counters reported at the end of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Note windows walked, silent ones included.
    pub windows_encountered: u64,
    /// Note files written.
    pub notes_exported: u64,
}

/// File name for the note at the given 0-based window index.
fn output_name(prefix: &str, index: usize) -> Result<String, WavCutterError> {
    Ok(format!(
        "{prefix}_-_{:02}_{}.wav",
        index + 1,
        note_suffix(index)?
    ))
}

/// Delete note files left in the output directory by a previous run.
///
/// Matches on the `<prefix>_-_` marker so the input recording itself and
/// unrelated files are never touched.
fn delete_previous_notes(config: &Config) -> Result<(), WavCutterError> {
    let marker = format!("{}_-_", config.prefix);
    for entry in fs::read_dir(&config.output_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with(&marker) && path != config.input_path {
            info!("deleting: {}", path.display());
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

/// Decode and segment the input, returning the paths that a full run would
/// write without touching the file system.
pub fn plan_notes(config: &Config) -> Result<Vec<PathBuf>, WavCutterError> {
    let bytes = fs::read(&config.input_path)?;
    let audio = wav::decode(&bytes)?;
    let mut plan = Vec::new();
    for note in Segmenter::new(&audio) {
        if note.is_silent() {
            continue;
        }
        plan.push(
            config
                .output_dir
                .join(output_name(&config.prefix, note.index)?),
        );
    }
    Ok(plan)
}

/// Perform the cutting run described by `config`.
pub fn run(config: Config) -> Result<RunMetrics, WavCutterError> {
    run_with_progress(config, |_| {})
}

/// Like [`run`], invoking `progress` as windows are processed.
pub fn run_with_progress<F>(config: Config, mut progress: F) -> Result<RunMetrics, WavCutterError>
where
    F: FnMut(ProgressEvent),
{
    info!("cutting '{}'", config.input_path.display());

    let bytes = fs::read(&config.input_path)?;
    if config.clean_previous {
        delete_previous_notes(&config)?;
    }

    let audio = wav::decode(&bytes)?;
    let segmenter = Segmenter::new(&audio);
    progress(ProgressEvent::Start {
        total_windows: segmenter.total_windows() as u64,
    });

    let mut metrics = RunMetrics::default();
    for note in segmenter {
        metrics.windows_encountered += 1;

        if note.is_silent() {
            progress(ProgressEvent::Window {
                index: note.index as u64,
                exported: false,
            });
            continue;
        }

        let name = output_name(&config.prefix, note.index)?;
        let output = wav::encode_note(&bytes, &audio, &note)?;
        let path = config.output_dir.join(name);
        fs::write(&path, output)?;
        info!("exported: {}", path.display());
        metrics.notes_exported += 1;
        progress(ProgressEvent::Window {
            index: note.index as u64,
            exported: true,
        });
    }
    progress(ProgressEvent::Finish);

    info!(
        "notes encountered: {}, notes exported: {}",
        metrics.windows_encountered, metrics.notes_exported
    );
    Ok(metrics)
}
