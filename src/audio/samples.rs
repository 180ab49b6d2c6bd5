use anyhow::Result;
use hound::WavReader;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Sample {
    pub data: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl Sample {
    /// Load a WAV file. Multi-channel files are averaged down to mono since the
    /// click is written identically to every output channel.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(anyhow::anyhow!("WAV header declares a sample rate of 0 Hz"));
        }

        let samples: Result<Vec<f32>, _> = match spec.sample_format {
            hound::SampleFormat::Float => reader.samples::<f32>().collect(),
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|sample| sample as f32 / scale))
                    .collect()
            }
        };
        let samples = samples?;

        if samples.is_empty() {
            return Err(anyhow::anyhow!("WAV file contains no audio"));
        }

        let channels = spec.channels.max(1) as usize;
        let data = if channels == 1 {
            samples
        } else {
            samples
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok(Sample {
            data,
            sample_rate: spec.sample_rate,
            channels: 1,
        })
    }

    pub fn from_data(data: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Sample {
            data,
            sample_rate,
            channels,
        }
    }

    /// The built-in click used when no sample file is configured.
    pub fn default_click(sample_rate: u32) -> Self {
        Sample::from_data(generate_click(sample_rate as f32, 0.06), sample_rate, 1)
    }

    /// Linear-interpolated copy at `target_rate`, so a click recorded at one
    /// rate plays at the right pitch on a device running at another.
    pub fn resampled(&self, target_rate: u32) -> Sample {
        if target_rate == self.sample_rate
            || self.data.is_empty()
            || target_rate == 0
            || self.sample_rate == 0
        {
            return self.clone();
        }

        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = ((self.data.len() as f64) / ratio).round().max(1.0) as usize;
        let last = self.data.len() - 1;

        let data = (0..out_len)
            .map(|i| {
                let position = i as f64 * ratio;
                let index = (position.floor() as usize).min(last);
                let next = (index + 1).min(last);
                let frac = (position - index as f64) as f32;
                self.data[index] * (1.0 - frac) + self.data[next] * frac
            })
            .collect();

        Sample {
            data,
            sample_rate: target_rate,
            channels: self.channels,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn duration_seconds(&self) -> f32 {
        self.len() as f32 / (self.sample_rate as f32 * self.channels as f32)
    }
}

/// Short woodblock-like click: a high sine with a fast exponential decay
/// and a little second partial for body.
pub fn generate_click(sample_rate: f32, duration: f32) -> Vec<f32> {
    let samples = (sample_rate * duration) as usize;
    let mut data = Vec::with_capacity(samples);

    for i in 0..samples {
        let t = i as f32 / sample_rate;
        let envelope = (-t * 90.0).exp();
        let tone = (2.0 * std::f32::consts::PI * 1800.0 * t).sin();
        let body = (2.0 * std::f32::consts::PI * 900.0 * t).sin() * 0.4;
        data.push((tone + body) * envelope * 0.6);
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sample_creation() {
        let data = vec![0.0, 0.5, -0.5, 1.0];
        let sample = Sample::from_data(data.clone(), 44100, 1);
        assert_eq!(sample.data, data);
        assert_eq!(sample.sample_rate, 44100);
        assert_eq!(sample.channels, 1);
        assert_eq!(sample.len(), 4);
    }

    #[test]
    fn test_generated_click_is_short_and_clean() {
        let click = generate_click(44100.0, 0.06);
        assert_eq!(click.len(), (44100.0 * 0.06) as usize);

        for sample in &click {
            assert!(sample.is_finite());
        }

        let max_amplitude = click.iter().map(|x| x.abs()).fold(0.0, f32::max);
        assert!(max_amplitude > 0.1, "Click should be audible");
        assert!(max_amplitude <= 1.0, "Click should not clip");

        // Energy is front-loaded so overlapping restarts don't smear.
        let head: f32 = click.iter().take(click.len() / 4).map(|s| s.abs()).sum();
        let tail: f32 = click.iter().skip(3 * click.len() / 4).map(|s| s.abs()).sum();
        assert!(head > tail * 10.0);
    }

    #[test]
    fn test_default_click_duration() {
        let click = Sample::default_click(48000);
        assert!(!click.is_empty());
        assert!((click.duration_seconds() - 0.06).abs() < 0.001);
    }

    #[test]
    fn test_load_int_wav_downmixes_to_mono() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("click.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let sample = Sample::from_wav_file(&path).unwrap();
        assert_eq!(sample.channels, 1);
        assert_eq!(sample.len(), 100);
        assert_eq!(sample.sample_rate, 44100);
        for value in &sample.data {
            assert!((value - 0.5).abs() < 0.001, "Expected averaged frame, got {}", value);
        }
    }

    #[test]
    fn test_load_float_wav() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("click.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for value in [0.25f32, -0.25, 0.5] {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let sample = Sample::from_wav_file(&path).unwrap();
        assert_eq!(sample.data, vec![0.25, -0.25, 0.5]);
    }

    #[test]
    fn test_resample_keeps_duration() {
        let click = Sample::default_click(44100);
        let resampled = click.resampled(48000);

        assert_eq!(resampled.sample_rate, 48000);
        assert!((resampled.duration_seconds() - click.duration_seconds()).abs() < 0.001);

        let same = click.resampled(44100);
        assert_eq!(same.data, click.data);
    }

    #[test]
    fn test_unknown_source_rate_is_left_alone() {
        let sample = Sample::from_data(vec![0.1, 0.2, 0.3], 0, 1);
        let resampled = sample.resampled(48000);
        assert_eq!(resampled.data, sample.data);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(Sample::from_wav_file(dir.path().join("nope.wav")).is_err());
    }
}
