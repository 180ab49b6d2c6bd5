pub mod beat;
pub mod scheduler;
pub mod tempo;

pub use beat::{BeatCursor, ElapsedTime, BEATS_PER_MEASURE};
pub use scheduler::{Scheduler, TimerHandle, TimerTask};
pub use tempo::{TempoCell, DEFAULT_BPM, MAX_BPM, MIN_BPM};

use std::time::{Duration, Instant};

use crate::audio::playback::{self, ClickPlayer};

const ELAPSED_STEP: Duration = Duration::from_secs(1);

/// The metronome component: tempo, beat position, elapsed time and the
/// self-rescheduling tick chain that drives the click.
///
/// Each tick reschedules its successor using the tempo read at that moment,
/// so tempo changes land on the next beat without restarting the chain.
pub struct Metronome {
    tempo: TempoCell,
    running: bool,
    cursor: BeatCursor,
    elapsed: ElapsedTime,
    scheduler: Scheduler,
    tick_timer: Option<TimerHandle>,
    elapsed_timer: Option<TimerHandle>,
    player: Box<dyn ClickPlayer>,
    tick_count: u64,
    failed_playbacks: u64,
}

impl Metronome {
    pub fn new(tempo: TempoCell, player: Box<dyn ClickPlayer>) -> Self {
        Metronome {
            tempo,
            running: false,
            cursor: BeatCursor::new(),
            elapsed: ElapsedTime::default(),
            scheduler: Scheduler::new(),
            tick_timer: None,
            elapsed_timer: None,
            player,
            tick_count: 0,
            failed_playbacks: 0,
        }
    }

    /// Begin ticking. The first beat lands one interval after `now`.
    /// Calling this while already running does nothing.
    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }

        self.running = true;
        self.cursor.reset();
        self.elapsed.reset();

        let interval = self.tempo.beat_interval();
        self.tick_timer = Some(self.scheduler.schedule(now + interval, TimerTask::Tick));
        self.elapsed_timer = Some(
            self.scheduler
                .schedule(now + ELAPSED_STEP, TimerTask::ElapsedSecond),
        );

        log::info!("Metronome started at {} BPM", self.tempo.get());
    }

    /// Stop ticking and cancel anything pending. Safe to call at any time.
    pub fn stop(&mut self) {
        let was_running = self.running;
        self.running = false;
        self.cursor.reset();

        if let Some(handle) = self.tick_timer.take() {
            self.scheduler.cancel(handle);
        }
        if let Some(handle) = self.elapsed_timer.take() {
            self.scheduler.cancel(handle);
        }

        if was_running {
            log::info!(
                "Metronome stopped after {} ticks ({})",
                self.tick_count,
                self.elapsed.display()
            );
        }
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.running {
            self.stop();
        } else {
            self.start(now);
        }
    }

    pub fn set_bpm(&mut self, value: i64) -> u32 {
        let bpm = self.tempo.set(value);
        log::debug!("Tempo set to {} BPM", bpm);
        bpm
    }

    pub fn increment_bpm(&mut self) -> u32 {
        self.tempo.nudge(1)
    }

    pub fn decrement_bpm(&mut self) -> u32 {
        self.tempo.nudge(-1)
    }

    /// Fire every timer that is due at `now`. Returns the number of ticks.
    pub fn pump(&mut self, now: Instant) -> usize {
        let mut ticks = 0;

        while let Some((handle, due, task)) = self.scheduler.pop_due(now) {
            match task {
                TimerTask::Tick => {
                    if self.tick_timer != Some(handle) {
                        log::debug!("Discarding stale tick {:?}", handle);
                        continue;
                    }
                    self.tick(due, now);
                    ticks += 1;
                }
                TimerTask::ElapsedSecond => {
                    if self.elapsed_timer != Some(handle) {
                        continue;
                    }
                    self.elapsed.tick();
                    self.elapsed_timer = Some(
                        self.scheduler
                            .schedule(due + ELAPSED_STEP, TimerTask::ElapsedSecond),
                    );
                }
            }
        }

        ticks
    }

    fn tick(&mut self, due: Instant, now: Instant) {
        self.cursor.advance();
        self.tick_count += 1;

        if !playback::trigger(self.player.as_mut()) {
            self.failed_playbacks += 1;
        }

        let interval = self.tempo.beat_interval();
        let lateness = now.saturating_duration_since(due);
        let next_due = if lateness >= interval {
            // Drop missed beats instead of replaying them in a burst.
            log::debug!("Tick serviced {:?} late, resyncing", lateness);
            now + interval
        } else {
            due + interval
        };

        self.tick_timer = Some(self.scheduler.schedule(next_due, TimerTask::Tick));
    }

    pub fn bpm(&self) -> u32 {
        self.tempo.get()
    }

    pub fn tempo(&self) -> &TempoCell {
        &self.tempo
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn current_beat(&self) -> usize {
        self.cursor.position()
    }

    pub fn elapsed(&self) -> ElapsedTime {
        self.elapsed
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn failed_playbacks(&self) -> u64 {
        self.failed_playbacks
    }

    pub fn next_tick_due(&self) -> Option<Instant> {
        self.tick_timer
            .and_then(|handle| self.scheduler.due_of(handle))
    }

    /// Time until the next pending timer of any kind, for repaint scheduling.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.scheduler
            .next_due()
            .map(|due| due.saturating_duration_since(now))
    }

    pub fn pending_ticks(&self) -> usize {
        self.scheduler.pending_of(TimerTask::Tick)
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }

    /// Swap the audio output, e.g. after the device settings changed.
    pub fn replace_player(&mut self, player: Box<dyn ClickPlayer>) {
        self.player = player;
    }

    pub fn set_click_volume(&mut self, volume: f32) {
        self.player.set_volume(volume);
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PlaybackError;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct RecordingPlayer {
        restarts: Rc<Cell<usize>>,
        fail: Rc<Cell<bool>>,
        volume: Rc<Cell<Option<f32>>>,
    }

    impl ClickPlayer for RecordingPlayer {
        fn restart(&mut self) -> Result<(), PlaybackError> {
            self.restarts.set(self.restarts.get() + 1);
            if self.fail.get() {
                Err(PlaybackError::StreamFailed("autoplay denied".to_string()))
            } else {
                Ok(())
            }
        }

        fn set_volume(&mut self, volume: f32) {
            self.volume.set(Some(volume));
        }
    }

    fn metronome(bpm: u32) -> (Metronome, RecordingPlayer) {
        let player = RecordingPlayer::default();
        let metronome = Metronome::new(TempoCell::new(bpm), Box::new(player.clone()));
        (metronome, player)
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    /// Advance in 10ms frames from `from` to `to`, recording the beat after each tick.
    fn run(metronome: &mut Metronome, from: Duration, to: Duration, base: Instant) -> Vec<usize> {
        let mut beats = Vec::new();
        let mut t = from;
        while t <= to {
            let ticks = metronome.pump(base + t);
            for _ in 0..ticks {
                beats.push(metronome.current_beat());
            }
            assert!(metronome.pending_ticks() <= 1, "only one tick chain may be live");
            t += ms(10);
        }
        beats
    }

    #[test]
    fn test_full_measure_at_60_bpm() {
        let (mut metronome, player) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        let beats = run(&mut metronome, ms(10), ms(4000), base);

        assert_eq!(beats, vec![1, 2, 3, 0]);
        assert_eq!(metronome.tick_count(), 4);
        assert_eq!(player.restarts.get(), 4);
        assert_eq!(metronome.current_beat(), 0);
    }

    #[test]
    fn test_stop_before_first_tick() {
        let (mut metronome, player) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        metronome.stop();

        let beats = run(&mut metronome, ms(0), ms(5000), base);
        assert!(beats.is_empty());
        assert_eq!(metronome.tick_count(), 0);
        assert_eq!(metronome.current_beat(), 0);
        assert_eq!(player.restarts.get(), 0);
        assert_eq!(metronome.pending_timers(), 0);
    }

    #[test]
    fn test_start_while_running_is_noop() {
        let (mut metronome, _) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        let first_due = metronome.next_tick_due();
        metronome.start(base + ms(300));
        metronome.start(base + ms(600));

        assert_eq!(metronome.pending_ticks(), 1);
        assert_eq!(metronome.next_tick_due(), first_due);

        let beats = run(&mut metronome, ms(10), ms(2000), base);
        assert_eq!(beats, vec![1, 2]);
    }

    #[test]
    fn test_stop_resets_cursor_and_cancels_ticks() {
        let (mut metronome, _) = metronome(120);
        let base = Instant::now();

        metronome.start(base);
        let beats = run(&mut metronome, ms(10), ms(1000), base);
        assert_eq!(beats, vec![1, 2]);
        assert_eq!(metronome.current_beat(), 2);

        metronome.stop();
        assert!(!metronome.is_running());
        assert_eq!(metronome.current_beat(), 0);
        assert!(metronome.next_tick_due().is_none());

        let beats = run(&mut metronome, ms(1010), ms(5000), base);
        assert!(beats.is_empty(), "no tick may fire after stop");
        assert_eq!(metronome.tick_count(), 2);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut metronome, _) = metronome(60);
        metronome.stop();
        metronome.stop();
        assert!(!metronome.is_running());
        assert_eq!(metronome.current_beat(), 0);

        let base = Instant::now();
        metronome.start(base);
        metronome.stop();
        metronome.stop();
        assert_eq!(metronome.pending_timers(), 0);
    }

    #[test]
    fn test_tick_interval_follows_tempo() {
        let base = Instant::now();

        let (mut slow, _) = metronome(60);
        slow.start(base);
        assert_eq!(slow.next_tick_due(), Some(base + ms(1000)));

        let (mut fast, _) = metronome(120);
        fast.start(base);
        assert_eq!(fast.next_tick_due(), Some(base + ms(500)));
    }

    #[test]
    fn test_tempo_change_applies_to_next_tick() {
        let (mut metronome, _) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        run(&mut metronome, ms(10), ms(1000), base);
        assert_eq!(metronome.tick_count(), 1);
        assert_eq!(metronome.next_tick_due(), Some(base + ms(2000)));

        // Already scheduled firing keeps its time, the one after uses the new tempo.
        metronome.set_bpm(120);
        run(&mut metronome, ms(1010), ms(2000), base);
        assert_eq!(metronome.tick_count(), 2);
        assert_eq!(metronome.next_tick_due(), Some(base + ms(2500)));
        assert!(metronome.is_running(), "no restart was needed");
    }

    #[test]
    fn test_tempo_written_through_shared_cell() {
        let (mut metronome, _) = metronome(60);
        let input_side = metronome.tempo().clone();
        let base = Instant::now();

        metronome.start(base);
        input_side.set(240);
        run(&mut metronome, ms(10), ms(1000), base);

        assert_eq!(metronome.next_tick_due(), Some(base + ms(1250)));
    }

    #[test]
    fn test_cursor_period_independent_of_tempo() {
        let (mut metronome, _) = metronome(240);
        let base = Instant::now();

        metronome.start(base);
        let beats = run(&mut metronome, ms(10), ms(3000), base);

        assert_eq!(beats.len(), 12);
        assert_eq!(beats, vec![1, 2, 3, 0, 1, 2, 3, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn test_playback_failure_does_not_stop_ticking() {
        let (mut metronome, player) = metronome(120);
        player.fail.set(true);
        let base = Instant::now();

        metronome.start(base);
        let beats = run(&mut metronome, ms(10), ms(2000), base);

        assert_eq!(beats, vec![1, 2, 3, 0]);
        assert_eq!(player.restarts.get(), 4);
        assert_eq!(metronome.failed_playbacks(), 4);
        assert!(metronome.is_running());
        assert_eq!(metronome.pending_ticks(), 1);
    }

    #[test]
    fn test_elapsed_time_counts_seconds() {
        let (mut metronome, _) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        run(&mut metronome, ms(10), ms(3000), base);
        assert_eq!(metronome.elapsed().display(), "00:03");

        metronome.stop();
        run(&mut metronome, ms(3010), ms(6000), base);
        assert_eq!(metronome.elapsed().seconds(), 3, "elapsed time freezes while stopped");

        metronome.start(base + ms(6000));
        assert_eq!(metronome.elapsed().seconds(), 0, "start resets the counter");
    }

    #[test]
    fn test_elapsed_catches_up_after_stall() {
        let (mut metronome, _) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        metronome.pump(base + ms(3500));
        assert_eq!(metronome.elapsed().seconds(), 3);
    }

    #[test]
    fn test_stalled_frame_drops_missed_beats() {
        let (mut metronome, player) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        let ticks = metronome.pump(base + ms(3500));

        assert_eq!(ticks, 1, "a long stall plays a single click");
        assert_eq!(player.restarts.get(), 1);
        assert_eq!(metronome.next_tick_due(), Some(base + ms(4500)));
    }

    #[test]
    fn test_exactly_one_interval_late_plays_once() {
        let (mut metronome, player) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        assert_eq!(metronome.pump(base + ms(2000)), 1);
        assert_eq!(player.restarts.get(), 1);
        assert_eq!(metronome.next_tick_due(), Some(base + ms(3000)));

        assert_eq!(metronome.pump(base + ms(2001)), 0);
    }

    #[test]
    fn test_click_volume_reaches_current_player() {
        let (mut metronome, player) = metronome(60);
        metronome.set_click_volume(0.4);
        assert_eq!(player.volume.get(), Some(0.4));

        let replacement = RecordingPlayer::default();
        metronome.replace_player(Box::new(replacement.clone()));
        metronome.set_click_volume(1.2);
        assert_eq!(replacement.volume.get(), Some(1.2));
        assert_eq!(player.volume.get(), Some(0.4));
    }

    #[test]
    fn test_toggle_and_nudge() {
        let (mut metronome, _) = metronome(239);
        let base = Instant::now();

        metronome.toggle(base);
        assert!(metronome.is_running());
        metronome.toggle(base);
        assert!(!metronome.is_running());

        assert_eq!(metronome.increment_bpm(), 240);
        assert_eq!(metronome.increment_bpm(), 240);

        metronome.set_bpm(31);
        assert_eq!(metronome.decrement_bpm(), 30);
        assert_eq!(metronome.decrement_bpm(), 30);
    }

    #[test]
    fn test_restart_after_stop_begins_a_fresh_chain() {
        let (mut metronome, _) = metronome(60);
        let base = Instant::now();

        metronome.start(base);
        run(&mut metronome, ms(10), ms(1500), base);
        metronome.stop();

        metronome.start(base + ms(1500));
        assert_eq!(metronome.pending_ticks(), 1);
        assert_eq!(metronome.next_tick_due(), Some(base + ms(2500)));

        let beats = run(&mut metronome, ms(1510), ms(2500), base);
        assert_eq!(beats, vec![1]);
    }

    #[test]
    fn test_time_until_next() {
        let (mut metronome, _) = metronome(120);
        let base = Instant::now();
        assert!(metronome.time_until_next(base).is_none());

        metronome.start(base);
        assert_eq!(metronome.time_until_next(base + ms(100)), Some(ms(400)));
    }

    #[test]
    fn test_drop_cancels_pending_timers() {
        let (mut metronome, player) = metronome(60);
        metronome.start(Instant::now());
        drop(metronome);
        assert_eq!(player.restarts.get(), 0);
    }
}
