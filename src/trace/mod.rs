//! Append-only binary trace recording.
//!
//! One flat file of little-endian f32 values per stream, no header; offline
//! consumers interpret them with the chunk size and sample rate known
//! out-of-band. Raw and filtered streams hold one value per sample, energy
//! and onset streams one value per chunk.
//!
//! Tracing is best-effort observability: a failed write logs a warning and
//! disables that stream, it never fails the processing call.

use crate::error::Result;
use log::warn;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// The recordable signal streams, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStream {
    /// Raw input samples, one value per sample.
    Raw,
    /// Band-pass filtered samples, one value per sample.
    Filtered,
    /// Short-time energy, one value per chunk.
    Energy,
    /// Onset decision encoded 1.0 / 0.0, one value per chunk.
    Onset,
}

impl TraceStream {
    pub const ALL: [TraceStream; 4] = [
        TraceStream::Raw,
        TraceStream::Filtered,
        TraceStream::Energy,
        TraceStream::Onset,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            TraceStream::Raw => "raw.bin",
            TraceStream::Filtered => "filtered.bin",
            TraceStream::Energy => "energy.bin",
            TraceStream::Onset => "onset.bin",
        }
    }

    fn index(&self) -> usize {
        match self {
            TraceStream::Raw => 0,
            TraceStream::Filtered => 1,
            TraceStream::Energy => 2,
            TraceStream::Onset => 3,
        }
    }
}

#[derive(Debug)]
struct StreamSink {
    stream: TraceStream,
    writer: BufWriter<File>,
    /// Set on the first failed write; the stream is abandoned from then on.
    failed: bool,
    written: u64,
}

impl StreamSink {
    fn append(&mut self, values: &[f32]) {
        if self.failed {
            return;
        }
        for value in values {
            if let Err(e) = self.writer.write_all(&value.to_le_bytes()) {
                warn!(
                    "trace stream '{}' disabled after write failure: {}",
                    self.stream.file_name(),
                    e
                );
                self.failed = true;
                return;
            }
            self.written += 1;
        }
    }

    fn flush(&mut self) {
        if self.failed {
            return;
        }
        if let Err(e) = self.writer.flush() {
            warn!(
                "trace stream '{}' disabled after flush failure: {}",
                self.stream.file_name(),
                e
            );
            self.failed = true;
        }
    }
}

/// Writes every intermediate signal of the pipeline to append-only binary
/// stores for offline inspection.
#[derive(Debug)]
pub struct TraceRecorder {
    sinks: Vec<StreamSink>,
}

impl TraceRecorder {
    /// Open (truncating) one store per stream under `dir`.
    ///
    /// Failing to open a store at startup is a hard error; only failures
    /// during recording are swallowed.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;

        let mut sinks = Vec::with_capacity(TraceStream::ALL.len());
        for stream in TraceStream::ALL {
            let file = File::create(dir.join(stream.file_name()))?;
            sinks.push(StreamSink {
                stream,
                writer: BufWriter::new(file),
                failed: false,
                written: 0,
            });
        }

        Ok(Self { sinks })
    }

    /// Append a run of values to a stream, preserving order.
    pub fn append_samples(&mut self, stream: TraceStream, values: &[f32]) {
        self.sinks[stream.index()].append(values);
    }

    /// Append a single chunk-rate value to a stream.
    pub fn append_value(&mut self, stream: TraceStream, value: f32) {
        self.sinks[stream.index()].append(&[value]);
    }

    /// Push all buffered values to disk. Called once per chunk and at
    /// shutdown.
    pub fn flush(&mut self) {
        for sink in &mut self.sinks {
            sink.flush();
        }
    }

    /// Total values written to a stream so far.
    pub fn written(&self, stream: TraceStream) -> u64 {
        self.sinks[stream.index()].written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn read_f32_file(path: &Path) -> Vec<f32> {
        let bytes = std::fs::read(path).unwrap();
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    #[test]
    fn test_raw_round_trip_exact() {
        let dir = tempdir().unwrap();
        let samples: Vec<f32> = (0..2048).map(|i| (i as f32 / 100.0).sin()).collect();

        let mut recorder = TraceRecorder::create(dir.path()).unwrap();
        recorder.append_samples(TraceStream::Raw, &samples[..1024]);
        recorder.append_samples(TraceStream::Raw, &samples[1024..]);
        recorder.flush();

        let read_back = read_f32_file(&dir.path().join("raw.bin"));
        assert_eq!(read_back, samples, "raw trace must round-trip losslessly");
    }

    #[test]
    fn test_streams_are_independent() {
        let dir = tempdir().unwrap();
        let mut recorder = TraceRecorder::create(dir.path()).unwrap();

        recorder.append_samples(TraceStream::Raw, &[0.1; 8]);
        recorder.append_samples(TraceStream::Filtered, &[0.2; 8]);
        recorder.append_value(TraceStream::Energy, 0.5);
        recorder.append_value(TraceStream::Onset, 1.0);
        recorder.flush();

        assert_eq!(read_f32_file(&dir.path().join("raw.bin")).len(), 8);
        assert_eq!(read_f32_file(&dir.path().join("filtered.bin")).len(), 8);
        assert_eq!(read_f32_file(&dir.path().join("energy.bin")), vec![0.5]);
        assert_eq!(read_f32_file(&dir.path().join("onset.bin")), vec![1.0]);
    }

    #[test]
    fn test_written_counts() {
        let dir = tempdir().unwrap();
        let mut recorder = TraceRecorder::create(dir.path()).unwrap();

        recorder.append_samples(TraceStream::Raw, &[0.0; 1024]);
        recorder.append_value(TraceStream::Energy, 0.0);

        assert_eq!(recorder.written(TraceStream::Raw), 1024);
        assert_eq!(recorder.written(TraceStream::Energy), 1);
        assert_eq!(recorder.written(TraceStream::Onset), 0);
    }

    #[test]
    fn test_create_truncates_previous_run() {
        let dir = tempdir().unwrap();

        let mut first = TraceRecorder::create(dir.path()).unwrap();
        first.append_samples(TraceStream::Raw, &[1.0; 16]);
        first.flush();
        drop(first);

        let mut second = TraceRecorder::create(dir.path()).unwrap();
        second.append_samples(TraceStream::Raw, &[2.0; 4]);
        second.flush();

        assert_eq!(read_f32_file(&dir.path().join("raw.bin")), vec![2.0; 4]);
    }
}
