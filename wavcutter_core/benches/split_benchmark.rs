use std::f32::consts::TAU;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use tempfile::TempDir;
use wavcutter_core::{run, Config};

struct SyntheticRecording {
    _dir: TempDir,
    path: PathBuf,
}

impl SyntheticRecording {
    fn new(file_name: &str, sample_rate: u32, notes: u32, frequency: f32) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join(file_name);
        write_note_recording(&path, sample_rate, notes, frequency)?;
        Ok(Self { _dir: dir, path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

/// Synthesize a 24-bit mono recording with one decaying sine note at the
/// start of every eight-second window.
fn write_note_recording(
    path: &Path,
    sample_rate: u32,
    notes: u32,
    frequency: f32,
) -> io::Result<()> {
    let window_len = 8 * sample_rate as usize;
    let note_len = 2 * sample_rate as usize;
    let amplitude = 4_000_000.0f32;
    let mut samples = vec![0i32; window_len * notes as usize];

    for note in 0..notes as usize {
        for i in 0..note_len {
            let t = i as f32 / sample_rate as f32;
            let envelope = 1.0 - i as f32 / note_len as f32;
            samples[note * window_len + i] =
                (amplitude * envelope * (frequency * TAU * t).sin()) as i32;
        }
    }

    let data_len = (samples.len() * 3) as u32;
    let chunk_size = 36u32 + data_len;

    let mut file = File::create(path)?;
    file.write_all(b"RIFF")?;
    file.write_all(&chunk_size.to_le_bytes())?;
    file.write_all(b"WAVE")?;
    file.write_all(b"fmt ")?;
    file.write_all(&16u32.to_le_bytes())?; // PCM header length
    file.write_all(&1u16.to_le_bytes())?; // PCM format
    file.write_all(&1u16.to_le_bytes())?; // channels
    file.write_all(&sample_rate.to_le_bytes())?;
    file.write_all(&(sample_rate * 3).to_le_bytes())?; // byte rate
    file.write_all(&3u16.to_le_bytes())?; // block align
    file.write_all(&24u16.to_le_bytes())?; // bits per sample
    file.write_all(b"data")?;
    file.write_all(&data_len.to_le_bytes())?;
    for sample in &samples {
        file.write_all(&sample.to_le_bytes()[..3])?;
    }

    Ok(())
}

struct Scenario {
    name: &'static str,
    sample_rate: u32,
    notes: u32,
}

fn cut_benchmarks(c: &mut Criterion) {
    let scenarios = [
        Scenario {
            name: "4_notes_8khz",
            sample_rate: 8_000,
            notes: 4,
        },
        Scenario {
            name: "4_notes_44khz",
            sample_rate: 44_100,
            notes: 4,
        },
        Scenario {
            name: "16_notes_44khz",
            sample_rate: 44_100,
            notes: 16,
        },
    ];

    let mut group = c.benchmark_group("note_cut");
    group.sample_size(10);

    for scenario in scenarios {
        let fixture =
            SyntheticRecording::new("recording.wav", scenario.sample_rate, scenario.notes, 440.0)
                .expect("failed to synthesize recording fixture");

        group.bench_with_input(
            BenchmarkId::from_parameter(scenario.name),
            &fixture,
            |b, fixture| {
                b.iter_batched(
                    || {
                        Config::new(fixture.path()).expect("failed to build config")
                    },
                    |config| {
                        run(config).expect("cut run failed");
                    },
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, cut_benchmarks);
criterion_main!(benches);
