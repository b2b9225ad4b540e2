//! RIFF/WAVE container parsing and per-note re-encoding.
//!
//! Binary layout as described at <http://soundfile.sapp.org/doc/WaveFormat/>.
//! Only little-endian 24-bit PCM containers are accepted; everything else is
//! rejected before any samples are decoded.

use log::info;

use crate::segment::NoteSegment;
use crate::WavCutterError;

/// Container fields consumed by the pipeline.
#[derive(Clone, Copy, Debug)]
pub struct WavHeader {
    /// Number of channels, read from byte 22. Only 1 and 2 occur in practice.
    pub channels: u16,
    /// Sample rate in Hz, little-endian u32 at byte 24.
    pub sample_rate: u32,
    /// Bytes per sample, byte 34 divided by 8. Must be 3.
    pub bytes_per_sample: usize,
    /// Byte offset where the sample data of the `data` subchunk begins.
    pub data_offset: usize,
}

/// Fully decoded audio: one signed sample sequence per channel.
///
/// `right` is `None` for mono input; when present it has the same length as
/// `left`.
#[derive(Clone, Debug)]
pub struct AudioData {
    pub header: WavHeader,
    pub left: Vec<i32>,
    pub right: Option<Vec<i32>>,
}

impl AudioData {
    /// Number of per-channel samples.
    pub fn samples(&self) -> usize {
        self.left.len()
    }
}

/// Read one 24-bit little-endian sample and sign-extend it to `i32`.
///
/// The caller must guarantee `pos + 2 < data.len()`.
pub(crate) fn read_sample(data: &[u8], pos: usize) -> i32 {
    let mut value = u32::from(data[pos])
        | u32::from(data[pos + 1]) << 8
        | u32::from(data[pos + 2]) << 16;
    // Sign bit lives in the top bit of the third byte.
    if data[pos + 2] & 0x80 != 0 {
        value |= 0xff00_0000;
    }
    value as i32
}

/// Scale `value` by `volume` and write its low three bytes little-endian.
///
/// Sample widths other than 3 bytes are rejected rather than silently
/// writing zeroes.
pub(crate) fn write_sample(
    value: i32,
    target: &mut [u8],
    pos: usize,
    bytes_per_sample: usize,
    volume: f32,
) -> Result<(), WavCutterError> {
    if bytes_per_sample != 3 {
        return Err(WavCutterError::EncodingUnsupported { bytes_per_sample });
    }
    let scaled = (value as f32 * volume) as i32;
    target[pos..pos + 3].copy_from_slice(&scaled.to_le_bytes()[..3]);
    Ok(())
}

/// Parse the container and materialize the per-channel sample sequences.
pub fn decode(wav: &[u8]) -> Result<AudioData, WavCutterError> {
    if wav.len() < 44 {
        return Err(WavCutterError::MalformedContainer);
    }

    // Byte 3 is 'F' for "RIFF" but differs for big-endian "RIFX" containers.
    if wav[3] != b'F' {
        return Err(WavCutterError::UnsupportedFormat {
            reason: "container is big-endian, only little-endian is supported",
        });
    }

    let channels = u16::from(wav[22]);
    let bytes_per_sample = usize::from(wav[34] / 8);
    let sample_rate = u32::from_le_bytes([wav[24], wav[25], wav[26], wav[27]]);

    info!("bytes in file: {}", wav.len());
    info!("channels: {channels}");
    info!("bytes per sample: {bytes_per_sample}");
    info!("sample rate: {sample_rate}");

    if bytes_per_sample != 3 {
        return Err(WavCutterError::UnsupportedFormat {
            reason: "bytes per sample not supported, must be 3",
        });
    }
    if channels != 1 && channels != 2 {
        return Err(WavCutterError::UnsupportedFormat {
            reason: "only mono and stereo containers are supported",
        });
    }

    // Walk the subchunks starting after the 12-byte RIFF header until the
    // `data` tag shows up. The scan is bounded by the buffer length.
    let mut pos = 12usize;
    let data_offset = loop {
        if pos + 8 > wav.len() {
            return Err(WavCutterError::MalformedContainer);
        }
        if &wav[pos..pos + 4] == b"data" {
            break pos + 8;
        }
        let chunk_size =
            u32::from_le_bytes([wav[pos + 4], wav[pos + 5], wav[pos + 6], wav[pos + 7]]) as usize;
        pos += 8 + chunk_size;
    };

    let mut samples = (wav.len() - data_offset) / bytes_per_sample;
    if channels == 2 {
        samples /= 2;
    }

    let mut left = Vec::with_capacity(samples);
    let mut right = if channels == 2 {
        Some(Vec::with_capacity(samples))
    } else {
        None
    };

    let frame_size = usize::from(channels) * bytes_per_sample;
    let mut pos = data_offset;
    while pos + frame_size <= wav.len() {
        left.push(read_sample(wav, pos));
        pos += bytes_per_sample;
        if let Some(right) = right.as_mut() {
            right.push(read_sample(wav, pos));
            pos += bytes_per_sample;
        }
    }

    Ok(AudioData {
        header: WavHeader {
            channels,
            sample_rate,
            bytes_per_sample,
            data_offset,
        },
        left,
        right,
    })
}

/// Build one complete output WAV for a note segment.
///
/// The header bytes are copied verbatim from the source container with the
/// channel-count byte rewritten. The RIFF and data size fields are left
/// stale; VLC, Unreal and Audacity all accept such files.
pub fn encode_note(
    wav: &[u8],
    audio: &AudioData,
    note: &NoteSegment,
) -> Result<Vec<u8>, WavCutterError> {
    let header = &audio.header;
    let channels = usize::from(header.channels);
    let frame_size = channels * header.bytes_per_sample;

    let mut output = vec![0u8; header.data_offset + note.audible_len * frame_size];
    output[..header.data_offset].copy_from_slice(&wav[..header.data_offset]);
    output[22] = header.channels as u8;

    for i in 0..note.audible_len {
        let volume = note.volume_at(i);
        let pos = header.data_offset + i * frame_size;
        write_sample(
            audio.left[note.start + i],
            &mut output,
            pos,
            header.bytes_per_sample,
            volume,
        )?;
        if let Some(right) = &audio.right {
            write_sample(
                right[note.start + i],
                &mut output,
                pos + header.bytes_per_sample,
                header.bytes_per_sample,
                volume,
            )?;
        }
    }

    Ok(output)
}
