pub const BEATS_PER_MEASURE: usize = 4;

/// Position of the highlighted beat within the current measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BeatCursor {
    position: usize,
}

impl BeatCursor {
    pub fn new() -> Self {
        BeatCursor::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn advance(&mut self) -> usize {
        self.position = (self.position + 1) % BEATS_PER_MEASURE;
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }
}

/// Whole seconds spent running since the last start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElapsedTime {
    seconds: u64,
}

impl ElapsedTime {
    pub fn seconds(&self) -> u64 {
        self.seconds
    }

    pub fn tick(&mut self) {
        self.seconds += 1;
    }

    pub fn reset(&mut self) {
        self.seconds = 0;
    }

    /// `mm:ss`, minutes keep counting past 59.
    pub fn display(&self) -> String {
        format!("{:02}:{:02}", self.seconds / 60, self.seconds % 60)
    }
}
