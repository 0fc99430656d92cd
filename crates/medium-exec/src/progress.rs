//! Batch counting with a fixed reporting cadence.

#[derive(Debug, Clone)]
pub struct BatchProgress {
    every: u64,
    batches: u64,
    rows: u64,
}

impl BatchProgress {
    /// `every` of zero is treated as one.
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            batches: 0,
            rows: 0,
        }
    }

    /// Count one batch; returns true when a progress line is due.
    pub fn record(&mut self, rows: usize) -> bool {
        self.batches += 1;
        self.rows += rows as u64;
        self.batches % self.every == 0
    }

    pub fn batches(&self) -> u64 {
        self.batches
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }
}
