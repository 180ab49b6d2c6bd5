use anyhow::Result;
use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    Device, SampleFormat, SampleRate, Stream, StreamConfig,
};
use std::sync::{Arc, Mutex};

use super::playback::{ClickPlayer, PlaybackError};
use super::Sample;
use crate::settings::AudioSettings;

/// The one click voice shared by every tick. Restarting rewinds it; there
/// is no queue, a new request simply takes over the playhead.
#[derive(Debug)]
pub struct ClickVoice {
    sample: Sample,
    position: usize,
    active: bool,
    volume: f32,
}

impl ClickVoice {
    pub fn new(sample: Sample, volume: f32) -> Self {
        ClickVoice {
            sample,
            position: 0,
            active: false,
            volume,
        }
    }

    pub fn restart(&mut self) {
        self.position = 0;
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    /// Fill an interleaved buffer, writing the mono click to every channel.
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        output.fill(0.0);
        if !self.active {
            return;
        }

        for frame in output.chunks_mut(channels.max(1)) {
            if self.position >= self.sample.data.len() {
                self.active = false;
                break;
            }

            let value = (self.sample.data[self.position] * self.volume).clamp(-1.0, 1.0);
            frame.fill(value);
            self.position += 1;
        }
    }
}

pub struct AudioEngine {
    _stream: Stream,
    voice: Arc<Mutex<ClickVoice>>,
    stream_error: Arc<Mutex<Option<String>>>,
    device_name: String,
    sample_rate: f32,
}

impl AudioEngine {
    pub fn new(settings: &AudioSettings) -> Result<Self> {
        let host = cpal::default_host();
        let device = select_device(&host, settings.preferred_device.as_deref())?;
        let device_name = device.name().unwrap_or_else(|_| "Unknown device".to_string());

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let click = load_click(settings, sample_rate);
        log::info!(
            "Opening {} at {} Hz, {} channels ({:.0} ms click)",
            device_name,
            sample_rate,
            channels,
            click.duration_seconds() * 1000.0
        );

        let voice = Arc::new(Mutex::new(ClickVoice::new(click, settings.master_volume)));
        let stream_error = Arc::new(Mutex::new(None));

        let voice_clone = Arc::clone(&voice);
        let error_clone = Arc::clone(&stream_error);
        let on_error = move |err: cpal::StreamError| {
            log::error!("Audio stream error: {}", err);
            if let Ok(mut slot) = error_clone.lock() {
                *slot = Some(err.to_string());
            }
        };

        let stream_config = StreamConfig {
            channels: channels as u16,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = match config.sample_format() {
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    audio_callback(data, &voice_clone, channels)
                },
                on_error,
                None,
            )?,
            SampleFormat::I16 => device.build_output_stream(
                &stream_config,
                move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                    let mut f32_data = vec![0.0f32; data.len()];
                    audio_callback(&mut f32_data, &voice_clone, channels);
                    for (i, sample) in f32_data.iter().enumerate() {
                        data[i] = (*sample * i16::MAX as f32) as i16;
                    }
                },
                on_error,
                None,
            )?,
            SampleFormat::U16 => device.build_output_stream(
                &stream_config,
                move |data: &mut [u16], _: &cpal::OutputCallbackInfo| {
                    let mut f32_data = vec![0.0f32; data.len()];
                    audio_callback(&mut f32_data, &voice_clone, channels);
                    for (i, sample) in f32_data.iter().enumerate() {
                        data[i] = ((*sample + 1.0) * 0.5 * u16::MAX as f32) as u16;
                    }
                },
                on_error,
                None,
            )?,
            format => return Err(anyhow::anyhow!("Unsupported sample format: {:?}", format)),
        };

        stream.play()?;

        Ok(AudioEngine {
            _stream: stream,
            voice,
            stream_error,
            device_name,
            sample_rate: sample_rate as f32,
        })
    }

    pub fn available_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        let names = host
            .output_devices()?
            .filter_map(|device| device.name().ok())
            .collect();
        Ok(names)
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }
}

impl ClickPlayer for AudioEngine {
    fn restart(&mut self) -> Result<(), PlaybackError> {
        if let Some(message) = self.stream_error.lock().ok().and_then(|slot| slot.clone()) {
            return Err(PlaybackError::StreamFailed(message));
        }

        let mut voice = self
            .voice
            .lock()
            .map_err(|_| PlaybackError::VoiceUnavailable)?;
        voice.restart();
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        match self.voice.lock() {
            Ok(mut voice) => voice.set_volume(volume),
            Err(_) => log::warn!("Click voice unavailable, volume not changed"),
        }
    }
}

fn select_device(host: &cpal::Host, preferred: Option<&str>) -> Result<Device> {
    if let Some(name) = preferred {
        let found = host
            .output_devices()?
            .find(|device| device.name().map(|n| n == name).unwrap_or(false));
        match found {
            Some(device) => return Ok(device),
            None => log::warn!("Preferred output device '{}' not found, using default", name),
        }
    }

    host.default_output_device()
        .ok_or_else(|| anyhow::anyhow!("No output device available"))
}

/// Configured WAV if it loads, otherwise the synthesized click.
fn load_click(settings: &AudioSettings, sample_rate: u32) -> Sample {
    if let Some(ref path) = settings.click_sample {
        match Sample::from_wav_file(path) {
            Ok(sample) => return sample.resampled(sample_rate),
            Err(err) => log::warn!(
                "Failed to load click sample {}: {}. Using built-in click.",
                path.display(),
                err
            ),
        }
    }
    Sample::default_click(sample_rate)
}

fn audio_callback(data: &mut [f32], voice: &Arc<Mutex<ClickVoice>>, channels: usize) {
    match voice.lock() {
        Ok(mut voice) => voice.process(data, channels),
        Err(_) => data.fill(0.0),
    }
}
