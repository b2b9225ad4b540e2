//! Silence-based note segmentation and note naming.
//!
//! The recording is assumed to hold one note at the start of every
//! eight-second window, with the rest of the window silent. Each window is
//! scanned backwards for the last audible sample, which fixes where the note
//! is cut and where the fade-out begins.

use crate::wav::AudioData;
use crate::WavCutterError;

/// Longest audible note the backward scan will look at, in seconds.
pub const MAX_NOTE_DURATION_SECS: f32 = 8.0;
/// Length of the linear fade applied past the last audible sample.
pub const FADE_OUT_DURATION_SECS: f32 = 0.001;
/// Spacing between consecutive note windows, in seconds.
pub const INTER_NOTE_GAP_SECS: f32 = 8.0;

/// Amplitude above which a sample counts as audible rather than noise
/// floor. Decoded magnitudes grow with sample width, so the threshold does
/// too.
pub fn audible_threshold(bytes_per_sample: usize) -> i32 {
    20i32.pow(bytes_per_sample as u32)
}

/// One note window after the silence-boundary search.
///
/// `audible_len == 0` means the window was judged entirely silent; no file
/// is emitted for it, but the window still consumes a slot in the naming
/// sequence.
#[derive(Clone, Copy, Debug)]
pub struct NoteSegment {
    /// 0-based window index, which also selects the pitch-name suffix.
    pub index: usize,
    /// Sample offset of the window start within the decoded sequence.
    pub start: usize,
    /// Offset within the segment where the linear fade begins.
    pub fade_start: usize,
    /// Number of samples to export, fade tail included.
    pub audible_len: usize,
}

impl NoteSegment {
    pub fn is_silent(&self) -> bool {
        self.audible_len == 0
    }

    /// Volume multiplier for sample `i` of the segment: 1.0 up to and
    /// including `fade_start`, then a linear ramp reaching 0 at the final
    /// sample.
    pub fn volume_at(&self, i: usize) -> f32 {
        if i <= self.fade_start || self.fade_start >= self.audible_len {
            1.0
        } else {
            1.0 - (i - self.fade_start) as f32 / (self.audible_len - self.fade_start) as f32
        }
    }
}

/// Lazy, single-pass iterator over the fixed note windows of a recording.
pub struct Segmenter<'a> {
    audio: &'a AudioData,
    threshold: i32,
    window_len: usize,
    scan_len: usize,
    fade_len: usize,
    start: usize,
    index: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(audio: &'a AudioData) -> Self {
        let rate = audio.header.sample_rate as f32;
        Self {
            audio,
            threshold: audible_threshold(audio.header.bytes_per_sample),
            window_len: (INTER_NOTE_GAP_SECS * rate).round() as usize,
            scan_len: (MAX_NOTE_DURATION_SECS * rate).round() as usize,
            fade_len: (FADE_OUT_DURATION_SECS * rate).round() as usize,
            start: 0,
            index: 0,
        }
    }

    /// Number of windows this iterator will yield in total.
    pub fn total_windows(&self) -> usize {
        if self.window_len == 0 {
            0
        } else {
            self.audio.samples() / self.window_len
        }
    }

    fn is_audible(&self, index: usize) -> bool {
        if self.audio.left[index].abs() > self.threshold {
            return true;
        }
        match &self.audio.right {
            Some(right) => right[index].abs() > self.threshold,
            None => false,
        }
    }
}

impl Iterator for Segmenter<'_> {
    type Item = NoteSegment;

    fn next(&mut self) -> Option<NoteSegment> {
        let total = self.audio.samples();
        if self.window_len == 0 || self.start + self.window_len > total {
            return None;
        }

        // Scan backwards so the first hit is the last audible sample in
        // playback order; trailing silence is trimmed while the attack and
        // body of the note survive intact.
        let scan_end = self.scan_len.min(total - self.start - 1);
        let mut fade_start = 0;
        let mut audible_len = 0;
        for i in (1..=scan_end).rev() {
            if self.is_audible(self.start + i) {
                fade_start = i;
                audible_len = (i + self.fade_len).min(total - self.start);
                break;
            }
        }

        let segment = NoteSegment {
            index: self.index,
            start: self.start,
            fade_start,
            audible_len,
        };
        self.start += self.window_len;
        self.index += 1;
        Some(segment)
    }
}

/// Chromatic pitch names covering a 96-note range, sharps marked with a
/// trailing `S`. Indexed by the 0-based window counter.
const NOTE_NAMES: [&str; 99] = [
    "A1", "A1S", "B1", //
    "C2", "C2S", "D2", "D2S", "E2", "F2", "F2S", "G2", "G2S", "A2", "A2S", "B2", //
    "C3", "C3S", "D3", "D3S", "E3", "F3", "F3S", "G3", "G3S", "A3", "A3S", "B3", //
    "C4", "C4S", "D4", "D4S", "E4", "F4", "F4S", "G4", "G4S", "A4", "A4S", "B4", //
    "C5", "C5S", "D5", "D5S", "E5", "F5", "F5S", "G5", "G5S", "A5", "A5S", "B5", //
    "C6", "C6S", "D6", "D6S", "E6", "F6", "F6S", "G6", "G6S", "A6", "A6S", "B6", //
    "C7", "C7S", "D7", "D7S", "E7", "F7", "F7S", "G7", "G7S", "A7", "A7S", "B7", //
    "C8", "C8S", "D8", "D8S", "E8", "F8", "F8S", "G8", "G8S", "A8", "A8S", "B8", //
    "C9", "C9S", "D9", "D9S", "E9", "F9", "F9S", "G9", "G9S", "A9", "A9S", "B9",
];

/// Pitch-name suffix for the note at `index`, or `NoteTableExhausted` when
/// the recording holds more windows than the table covers.
pub fn note_suffix(index: usize) -> Result<&'static str, WavCutterError> {
    NOTE_NAMES
        .get(index)
        .copied()
        .ok_or(WavCutterError::NoteTableExhausted {
            limit: NOTE_NAMES.len(),
        })
}
