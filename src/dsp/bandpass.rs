//! Band-pass biquad filter.
//!
//! Isolates the configured frequency band before energy tracking. A single
//! constant-skirt-gain biquad (Audio EQ Cookbook), designed once at
//! construction. Filter state carries across chunks so consecutive chunks
//! behave as one continuous sample stream.

use crate::error::{OnsetError, Result};
use std::f64::consts::PI;

/// Biquad coefficients, normalized by a0.
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy)]
struct BiquadCoeffs {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
}

impl BiquadCoeffs {
    /// Constant skirt gain band-pass design.
    ///
    /// Center frequency is the geometric mean of the cutoffs; Q follows from
    /// the bandwidth. Peak gain is Q * `gain`.
    fn band_pass(low_hz: f64, high_hz: f64, sample_rate: f64, gain: f64) -> Self {
        let fc = (low_hz * high_hz).sqrt();
        let bw = high_hz - low_hz;
        let q = fc / bw;

        let w0 = 2.0 * PI * fc / sample_rate;
        let alpha = w0.sin() / (2.0 * q);

        let b0 = alpha * gain;
        let b1 = 0.0;
        let b2 = -alpha * gain;
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * w0.cos();
        let a2 = 1.0 - alpha;

        BiquadCoeffs {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Stateful band-pass filter over a stream of f32 samples.
///
/// Coefficients are computed once; the delay line persists for the lifetime
/// of the filter and is never reset between chunks.
#[derive(Debug, Clone)]
pub struct BandPassFilter {
    coeffs: BiquadCoeffs,
    // Delay line: x[n-1], x[n-2], y[n-1], y[n-2]
    x1: f64,
    x2: f64,
    y1: f64,
    y2: f64,
}

impl BandPassFilter {
    /// Create a band-pass filter for the given band.
    ///
    /// Fails with a configuration error unless
    /// `0 < low_hz < high_hz < sample_rate / 2`.
    pub fn new(low_hz: f32, high_hz: f32, sample_rate: u32) -> Result<Self> {
        let nyquist = sample_rate as f32 / 2.0;

        if low_hz <= 0.0 {
            return Err(OnsetError::Config {
                reason: format!("low cutoff must be positive, got {} Hz", low_hz),
            });
        }
        if low_hz >= high_hz {
            return Err(OnsetError::Config {
                reason: format!(
                    "low cutoff ({} Hz) must be below high cutoff ({} Hz)",
                    low_hz, high_hz
                ),
            });
        }
        if high_hz >= nyquist {
            return Err(OnsetError::Config {
                reason: format!(
                    "high cutoff ({} Hz) must be below the Nyquist limit ({} Hz)",
                    high_hz, nyquist
                ),
            });
        }

        Ok(Self {
            coeffs: BiquadCoeffs::band_pass(low_hz as f64, high_hz as f64, sample_rate as f64, 1.0),
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        })
    }

    /// Process a single sample. Direct Form I.
    fn process_sample(&mut self, input: f32) -> f32 {
        let x = input as f64;
        let c = &self.coeffs;
        let y = c.b0 * x + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = x;
        self.y2 = self.y1;
        self.y1 = y;

        y as f32
    }

    /// Filter one chunk, returning a filtered chunk of the same length.
    ///
    /// The delay line is updated as a side effect; calling this with chunk
    /// N+1 continues the stream started by chunk N.
    pub fn process_chunk(&mut self, chunk: &[f32]) -> Vec<f32> {
        chunk.iter().map(|&s| self.process_sample(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(frequency: f32, sample_rate: f32, num_samples: usize) -> Vec<f32> {
        (0..num_samples)
            .map(|i| (2.0 * PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    /// RMS over a slice, skipping nothing.
    fn rms(signal: &[f32]) -> f32 {
        let sum_sq: f32 = signal.iter().map(|s| s * s).sum();
        (sum_sq / signal.len() as f32).sqrt()
    }

    #[test]
    fn test_rejects_invalid_band() {
        assert!(BandPassFilter::new(0.0, 120.0, 44100).is_err());
        assert!(BandPassFilter::new(-40.0, 120.0, 44100).is_err());
        assert!(BandPassFilter::new(120.0, 40.0, 44100).is_err());
        assert!(BandPassFilter::new(120.0, 120.0, 44100).is_err());
        assert!(BandPassFilter::new(40.0, 22050.0, 44100).is_err());
        assert!(BandPassFilter::new(40.0, 30000.0, 44100).is_err());
    }

    #[test]
    fn test_accepts_valid_band() {
        assert!(BandPassFilter::new(40.0, 120.0, 44100).is_ok());
        assert!(BandPassFilter::new(100.0, 10000.0, 48000).is_ok());
    }

    #[test]
    fn test_passes_frequency_in_passband() {
        let mut filter = BandPassFilter::new(100.0, 10000.0, 48000).unwrap();
        let input = sine(1000.0, 48000.0, 1024);
        let output = filter.process_chunk(&input);

        // Skip the transient response, measure the settled tail.
        let settled = rms(&output[500..]);
        assert!(settled > 0.5, "passband tone attenuated to {}", settled);
        assert!(settled < 1.5, "passband tone amplified to {}", settled);
    }

    #[test]
    fn test_attenuates_frequency_below_passband() {
        let mut filter = BandPassFilter::new(100.0, 10000.0, 48000).unwrap();
        let input = sine(50.0, 48000.0, 1024);
        let output = filter.process_chunk(&input);

        let settled = rms(&output[500..]);
        assert!(settled < 0.4, "stopband tone passed at {}", settled);
    }

    #[test]
    fn test_attenuates_frequency_above_passband() {
        let mut filter = BandPassFilter::new(40.0, 120.0, 44100).unwrap();
        let input = sine(4000.0, 44100.0, 4096);
        let output = filter.process_chunk(&input);

        let settled = rms(&output[2048..]);
        assert!(settled < 0.1, "stopband tone passed at {}", settled);
    }

    #[test]
    fn test_blocks_dc() {
        let mut filter = BandPassFilter::new(100.0, 10000.0, 48000).unwrap();
        let input = vec![1.0f32; 1000];
        let output = filter.process_chunk(&input);

        assert!(
            output.last().unwrap().abs() < 0.01,
            "DC leaked through: {}",
            output.last().unwrap()
        );
    }

    #[test]
    fn test_impulse_response_settles() {
        let mut filter = BandPassFilter::new(100.0, 10000.0, 48000).unwrap();
        filter.process_sample(1.0);
        let mut last = 0.0;
        for _ in 0..1000 {
            last = filter.process_sample(0.0);
        }
        assert!(last.abs() < 0.001, "impulse response did not settle: {}", last);
    }

    #[test]
    fn test_bounded_output_for_bounded_input() {
        // Worst-case alternating full-scale input across many chunks.
        let mut filter = BandPassFilter::new(40.0, 120.0, 44100).unwrap();
        let chunk: Vec<f32> = (0..1024).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();

        for _ in 0..100 {
            let output = filter.process_chunk(&chunk);
            for &s in &output {
                assert!(s.is_finite(), "filter produced non-finite output");
                assert!(s.abs() < 10.0, "filter output unbounded: {}", s);
            }
        }
    }

    #[test]
    fn test_chunk_boundary_continuity() {
        // One 2048-sample call must equal two 1024-sample calls.
        let input = sine(80.0, 44100.0, 2048);

        let mut whole = BandPassFilter::new(40.0, 120.0, 44100).unwrap();
        let expected = whole.process_chunk(&input);

        let mut split = BandPassFilter::new(40.0, 120.0, 44100).unwrap();
        let mut actual = split.process_chunk(&input[..1024]);
        actual.extend(split.process_chunk(&input[1024..]));

        assert_eq!(expected.len(), actual.len());
        for (e, a) in expected.iter().zip(actual.iter()) {
            assert_eq!(e, a, "chunked output diverged from continuous output");
        }
    }
}
