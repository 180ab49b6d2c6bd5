use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const MIN_BPM: u32 = 30;
pub const MAX_BPM: u32 = 240;
pub const DEFAULT_BPM: u32 = 60;

/// Clamp an arbitrary tempo request into the supported BPM range.
pub fn clamp_bpm(value: i64) -> u32 {
    value.clamp(MIN_BPM as i64, MAX_BPM as i64) as u32
}

/// Time between two beats at the given tempo.
pub fn beat_interval(bpm: u32) -> Duration {
    let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
    Duration::from_secs_f64(60.0 / bpm as f64)
}

/// Shared tempo value. Input handlers write it, the tick scheduler reads it
/// on every firing, so a change is picked up by the very next tick.
#[derive(Debug, Clone)]
pub struct TempoCell {
    bpm: Arc<AtomicU32>,
}

impl TempoCell {
    pub fn new(bpm: u32) -> Self {
        TempoCell {
            bpm: Arc::new(AtomicU32::new(clamp_bpm(bpm as i64))),
        }
    }

    pub fn get(&self) -> u32 {
        self.bpm.load(Ordering::Acquire)
    }

    /// Store `value` clamped to [MIN_BPM, MAX_BPM] and return what was stored.
    pub fn set(&self, value: i64) -> u32 {
        let bpm = clamp_bpm(value);
        self.bpm.store(bpm, Ordering::Release);
        bpm
    }

    pub fn nudge(&self, delta: i64) -> u32 {
        self.set(self.get() as i64 + delta)
    }

    pub fn beat_interval(&self) -> Duration {
        beat_interval(self.get())
    }
}

impl Default for TempoCell {
    fn default() -> Self {
        TempoCell::new(DEFAULT_BPM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bpm_is_clamped_to_range() {
        let tempo = TempoCell::default();
        assert_eq!(tempo.get(), 60);

        assert_eq!(tempo.set(10), MIN_BPM);
        assert_eq!(tempo.get(), 30);

        assert_eq!(tempo.set(1000), MAX_BPM);
        assert_eq!(tempo.get(), 240);

        assert_eq!(tempo.set(-5), MIN_BPM);
        assert_eq!(tempo.set(i64::MAX), MAX_BPM);

        for value in 30..=240 {
            assert_eq!(tempo.set(value), value as u32, "{} is in range and kept as is", value);
        }
    }

    #[test]
    fn test_new_clamps_initial_value() {
        assert_eq!(TempoCell::new(0).get(), MIN_BPM);
        assert_eq!(TempoCell::new(500).get(), MAX_BPM);
    }

    #[test]
    fn test_nudge_stops_at_bounds() {
        let tempo = TempoCell::new(239);
        assert_eq!(tempo.nudge(1), 240);
        assert_eq!(tempo.nudge(1), 240);

        tempo.set(31);
        assert_eq!(tempo.nudge(-1), 30);
        assert_eq!(tempo.nudge(-1), 30);
    }

    #[test]
    fn test_beat_interval() {
        assert_eq!(beat_interval(60), Duration::from_millis(1000));
        assert_eq!(beat_interval(120), Duration::from_millis(500));
        assert_eq!(beat_interval(240), Duration::from_millis(250));
        assert_eq!(beat_interval(30), Duration::from_millis(2000));
    }

    #[test]
    fn test_clones_share_the_latest_value() {
        let writer = TempoCell::new(60);
        let reader = writer.clone();

        writer.set(120);
        assert_eq!(reader.get(), 120);
        assert_eq!(reader.beat_interval(), Duration::from_millis(500));
    }
}
